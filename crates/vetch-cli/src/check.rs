//! # Check Subcommand
//!
//! Compiles a schema document once and runs it over each input document in
//! turn, printing the canonicalized output. Stops at the first input that
//! fails to parse.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use vetch_schema::{load_document, LeafRegistry, ParserOptions};

/// Arguments for the `vetch check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (.json, .yaml or .yml).
    #[arg(long, short, value_name = "PATH")]
    pub schema: PathBuf,

    /// Reject inputs that are null.
    #[arg(long)]
    pub required: bool,

    /// Raw default (JSON text) substituted for a null input.
    #[arg(long, value_name = "JSON")]
    pub default: Option<String>,

    /// Print compact JSON instead of pretty-printed JSON.
    #[arg(long)]
    pub compact: bool,

    /// Input documents (.json, .yaml or .yml).
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when every input parses, 1 on the first input that
/// does not. Unreadable files and invalid schemas are errors.
pub fn run_check(args: &CheckArgs, out: &mut dyn Write) -> Result<u8> {
    let document = load_document(&args.schema).context("failed to load schema document")?;

    let default = args
        .default
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--default is not valid JSON")?;
    let options = ParserOptions {
        required: args.required,
        default,
    };

    let parser = LeafRegistry::standard()
        .compile_document(&document, options)
        .with_context(|| format!("failed to compile schema {}", args.schema.display()))?;

    tracing::info!(schema = %args.schema.display(), inputs = args.inputs.len(), "compiled schema");

    for input in &args.inputs {
        let value = load_document(input).context("failed to load input document")?;
        match parser.call_value(&value) {
            Ok(parsed) => {
                let parsed = parsed.unwrap_or(Value::Null);
                let rendered = if args.compact {
                    serde_json::to_string(&parsed)?
                } else {
                    serde_json::to_string_pretty(&parsed)?
                };
                writeln!(out, "{rendered}")?;
                tracing::debug!(input = %input.display(), "input accepted");
            }
            Err(e) => {
                writeln!(out, "FAIL: {} — {e}", input.display())?;
                return Ok(1);
            }
        }
    }

    Ok(0)
}

/// Print the names of the registered leaf transforms, one per line.
pub fn run_leaves(out: &mut dyn Write) -> Result<u8> {
    for name in LeafRegistry::standard().names() {
        writeln!(out, "{name}")?;
    }
    Ok(0)
}
