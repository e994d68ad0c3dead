//! Validate command - check a token against its stored hash

use crate::cli::SourceArgs;
use anyhow::Result;
use clap::Args;
use console::{style, Emoji};
use saltcsrf_core::{Validation, DEFAULT_VALIDATION_TIMEOUT};
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "+ ");
static WARN: Emoji<'_, '_> = Emoji("⚠️ ", "! ");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "x ");

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Token presented by the client
    pub token: String,

    /// Hash stored when the token was issued
    pub hash: String,

    /// Give up and reject after this many milliseconds
    #[arg(long, default_value_t = DEFAULT_VALIDATION_TIMEOUT.as_millis() as u64)]
    pub timeout_ms: u64,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ValidateOutput {
    matched: bool,
    salt_index: isize,
}

/// Validate a (token, hash) pair. Exits non-zero on rejection.
pub async fn validate(source: &SourceArgs, args: ValidateArgs) -> Result<ExitCode> {
    let guard = source.guard()?;
    let timeout = Duration::from_millis(args.timeout_ms);

    let result = guard
        .validate_with_timeout(args.token, args.hash, timeout)
        .await;
    tracing::debug!(matched = result.is_valid(), "validation finished");

    if args.json {
        let (matched, salt_index) = result.as_pair();
        let output = ValidateOutput {
            matched,
            salt_index,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_result(&result);
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_result(result: &Validation) {
    match result {
        Validation::Matched { salt_index: 0 } => {
            println!("{} {}", CHECK, style("valid (current salt)").green());
        }
        Validation::Matched { salt_index } => {
            println!(
                "{} {} {}",
                WARN,
                style(format!("valid (retired salt #{})", salt_index)).yellow(),
                style("reissue under the current salt").dim()
            );
        }
        Validation::Rejected => {
            println!("{} {}", ERROR, style("invalid").red());
        }
    }
}
