use std::fmt;

use serde::Serialize;

/// Which stage reported a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lex,
    Parse,
}

/// A recoverable problem found while lexing or parsing.
///
/// Diagnostics never stop the pipeline. The offending character or token
/// is skipped and a best-effort tree is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn lex(line: usize, message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Lex,
            line,
            message: message.into(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Parse,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
        };
        write!(f, "{stage} error on line {}: {}", self.line, self.message)
    }
}
