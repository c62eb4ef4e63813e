//! Print the OpenAPI document as JSON or YAML.

use std::io::Write;
use std::path::PathBuf;

use accounts::ApiDoc;
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Write the accounts OpenAPI document",
    version
)]
struct CliArgs {
    /// Emit YAML instead of JSON.
    #[arg(long)]
    yaml: bool,
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
}

fn render(yaml: bool) -> Result<String> {
    let doc = ApiDoc::openapi();
    if yaml {
        doc.to_yaml().wrap_err("serialise OpenAPI document as YAML")
    } else {
        doc.to_pretty_json()
            .map(|json| json + "\n")
            .wrap_err("serialise OpenAPI document as JSON")
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let rendered = render(args.yaml)?;

    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .wrap_err_with(|| format!("write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .wrap_err("write OpenAPI document to stdout")?,
    }
    Ok(())
}
