use anyhow::{Context, Result, bail};
use rydown_config::{Config, OutputFormat};
use rydown_render::{Format, PlainHighlighter, render_with_tab_width};
use rydown_syntax::MarkdownParser;
use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "Usage: rydown [--html|--wiki] <input.md> [output]";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    format: Option<OutputFormat>,
    input: PathBuf,
    output: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut format = None;
    let mut paths = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--html" => format = Some(OutputFormat::Html),
            "--wiki" => format = Some(OutputFormat::Wiki),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path => paths.push(PathBuf::from(path)),
        }
    }

    let mut paths = paths.into_iter();
    let Some(input) = paths.next() else {
        bail!("no input file given");
    };
    let output = paths.next();
    if paths.next().is_some() {
        bail!("too many arguments");
    }
    Ok(Args {
        format,
        input,
        output,
    })
}

fn render_format(format: OutputFormat) -> Format {
    match format {
        OutputFormat::Html => Format::Html,
        OutputFormat::Wiki => Format::Wiki,
    }
}

/// Converts one file. Returns where the output went, `None` for stdout.
fn convert(args: &Args, config: &Config) -> Result<(String, Option<PathBuf>)> {
    let format = args.format.unwrap_or(config.format);
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut parser = MarkdownParser::new();
    let document = parser
        .parse(&text)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;
    let skipped = parser.diagnostics().len();
    if skipped > 0 {
        log::warn!(
            "{}: {skipped} malformed construct(s) skipped",
            args.input.display()
        );
    }

    let rendered = render_with_tab_width(
        &document,
        render_format(format),
        &PlainHighlighter,
        config.tab_width,
    );
    let destination = args
        .output
        .clone()
        .or_else(|| config.output_path_for(&args.input, format));
    Ok((rendered, destination))
}

fn write_output(rendered: &str, destination: Option<&Path>) -> Result<()> {
    match destination {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let result = convert(&args, &config)
        .and_then(|(rendered, destination)| write_output(&rendered, destination.as_deref()));
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
