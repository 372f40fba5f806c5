//! Resolution pass over a finished tree.
//!
//! Reference links are parsed before their definitions may have been seen,
//! so their URLs are attached here, once the whole reference table exists.
//! A key with no definition is a hard error: every missing key is reported
//! and no partially resolved tree is handed out.

use thiserror::Error;

use crate::ast::{Node, RefTable};

/// One or more reference links name a key that is never defined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unresolved reference link key(s): {}", .keys.join(", "))]
pub struct ResolutionError {
    /// Each missing key once, in document order.
    pub keys: Vec<String>,
}

/// Attaches a URL to every [`Node::RefLink`] under `nodes`, depth first.
///
/// Running it again with the same table changes nothing.
pub fn resolve(nodes: &mut [Node], references: &RefTable) -> Result<(), ResolutionError> {
    let mut missing = Vec::new();
    visit(nodes, references, &mut missing);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ResolutionError { keys: missing })
    }
}

fn visit(nodes: &mut [Node], references: &RefTable, missing: &mut Vec<String>) {
    for node in nodes {
        if let Node::RefLink { key, url, .. } = node {
            match references.get(key) {
                Some(found) => *url = Some(found.to_string()),
                None if !missing.contains(key) => missing.push(key.clone()),
                None => {}
            }
        }
        visit(node.children_mut(), references, missing);
    }
}

/// Deepest `Heading` level anywhere under `nodes`, 0 if there is none.
pub fn max_heading_level(nodes: &[Node]) -> u8 {
    nodes
        .iter()
        .map(|node| match node {
            Node::Heading { level, .. } => *level,
            _ => max_heading_level(node.children()),
        })
        .max()
        .unwrap_or(0)
}
