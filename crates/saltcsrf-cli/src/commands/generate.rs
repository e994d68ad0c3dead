//! Generate command - issue a token and its hash

use crate::cli::SourceArgs;
use anyhow::Result;
use clap::Args;
use console::style;
use serde::Serialize;
use std::process::ExitCode;

/// Arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    token: &'a str,
    hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Issue a token. Exits non-zero when no salt is configured, still printing
/// the token in JSON mode.
pub fn generate(source: &SourceArgs, args: GenerateArgs) -> Result<ExitCode> {
    let guard = source.guard()?;

    match guard.generate() {
        Ok(issued) => {
            if args.json {
                let output = GenerateOutput {
                    token: issued.token().as_str(),
                    hash: Some(issued.hash().as_str()),
                    error: None,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("token: {}", issued.token());
                println!("hash:  {}", issued.hash());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::warn!(source = %source.describe(), "generate called without salts");
            if args.json {
                let output = GenerateOutput {
                    token: err.token().as_str(),
                    hash: None,
                    error: Some(err.kind().to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                eprintln!(
                    "{} {} (source: {})",
                    style("error:").red().bold(),
                    err.kind(),
                    style(source.describe()).cyan()
                );
                eprintln!(
                    "Provision one with: {}",
                    style("saltcsrf salt new").cyan()
                );
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
