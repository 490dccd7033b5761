//! Tessera CLI
//!
//! Parses a markup file or string and prints it back serialized, as a tree
//! or as JSON. Parse diagnostics go to stderr through `tracing`.

mod dump;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tessera_dom::{NodeId, XmlSerializer};
use tessera_parser::{DomParser, ErrorLevel, OnError, ParserOptions};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Tessera: parse XML or HTML and print the resulting document
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Re-serialize an XML file
    tessera feed.xml

    # Print the DOM tree of an inline HTML string
    tessera --tree --html '<p>Hello<br>world</p>'

    # Dump an SVG file as JSON, failing on any error
    tessera --json --strict icon.svg

    # More diagnostics
    RUST_LOG=tessera_parser=debug tessera page.html
"#)]
struct Cli {
    /// Path to the file to parse
    #[arg(value_name = "FILE", required_unless_present = "html")]
    path: Option<String>,

    /// Parse this string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Content type to parse as (default: from the file extension)
    #[arg(short, long, value_name = "TYPE")]
    mime: Option<String>,

    /// Print the DOM tree
    #[arg(short, long, conflicts_with = "json")]
    tree: bool,

    /// Print the DOM as JSON
    #[arg(short, long)]
    json: bool,

    /// Treat parse errors as fatal
    #[arg(long)]
    strict: bool,

    /// Do not record source locations
    #[arg(long)]
    no_locator: bool,

    /// Suppress diagnostics
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let (source, mime_type) = load_source(&cli)?;
    let on_error = if cli.strict {
        strict_errors()
    } else {
        OnError::Default
    };
    let options = ParserOptions::default()
        .with_locator(!cli.no_locator)
        .with_on_error(on_error);

    let doc = DomParser::new(options)
        .parse_from_string(&source, &mime_type)
        .with_context(|| format!("failed to parse input as {mime_type}"))?;

    if cli.json {
        let json = dump::to_json(&doc, NodeId::ROOT);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if cli.tree {
        dump::print_tree(&doc, NodeId::ROOT, 0);
    } else {
        println!("{}", XmlSerializer.serialize_to_string(&doc, NodeId::ROOT));
    }
    Ok(())
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read the input and pick the content type to parse it as.
fn load_source(cli: &Cli) -> anyhow::Result<(String, String)> {
    if let Some(ref html) = cli.html {
        let mime_type = cli.mime.clone().unwrap_or_else(|| "text/html".to_string());
        return Ok((html.clone(), mime_type));
    }
    let Some(ref path) = cli.path else {
        anyhow::bail!("no input file or --html provided");
    };
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
    let mime_type = cli
        .mime
        .clone()
        .unwrap_or_else(|| mime_type_for(Path::new(path)).to_string());
    Ok((source, mime_type))
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("xhtml") => "application/xhtml+xml",
        Some("svg") => "image/svg+xml",
        _ => "text/xml",
    }
}

/// Warnings are logged; errors abort the parse.
fn strict_errors() -> OnError {
    OnError::Combined(Box::new(|level, message, _| {
        if level == ErrorLevel::Warning {
            warn!(target: "tessera_parser", "{message}");
            return Ok(());
        }
        Err(message.into())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_type_for(Path::new("a/page.HTML")), "text/html");
        assert_eq!(mime_type_for(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(mime_type_for(Path::new("doc.xhtml")), "application/xhtml+xml");
        assert_eq!(mime_type_for(Path::new("feed.xml")), "text/xml");
        assert_eq!(mime_type_for(Path::new("README")), "text/xml");
    }

    #[test]
    fn cli_arguments() {
        let cli = Cli::parse_from(["tessera", "--tree", "--html", "<p>x</p>"]);
        assert!(cli.tree);
        let (source, mime_type) = load_source(&cli).unwrap();
        assert_eq!(source, "<p>x</p>");
        assert_eq!(mime_type, "text/html");

        assert!(Cli::try_parse_from(["tessera", "--tree", "--json", "a.xml"]).is_err());
        assert!(Cli::try_parse_from(["tessera"]).is_err());
    }

    #[test]
    fn strict_mode_rejects_errors() {
        let mut parser = DomParser::new(ParserOptions::default().with_on_error(strict_errors()));
        assert!(parser.parse_from_string("<a>&nbsp;</a>", "text/xml").is_err());
        assert!(parser.parse_from_string("<a x=1></a>", "text/html").is_ok());
    }
}
