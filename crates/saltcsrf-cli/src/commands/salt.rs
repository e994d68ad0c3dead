//! Salt commands - provision and rotate salts

use crate::cli::SourceArgs;
use anyhow::{bail, Result};
use clap::Subcommand;
use saltcsrf_core::Salt;
use std::io::Write;
use std::process::ExitCode;

const DEFAULT_SALT_LEN: &str = "32";

/// Arguments for the `salt` command
#[derive(Subcommand, Debug)]
pub enum SaltArgs {
    /// Print a new random salt
    New {
        /// Salt length in characters
        #[arg(short, long, default_value = DEFAULT_SALT_LEN, value_parser = clap::value_parser!(u16).range(1..))]
        length: u16,
    },

    /// Print the salt list with a new current salt in front
    Rotate {
        /// Number of salts to keep, including the new one
        #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..))]
        keep: u16,

        /// Length of the new salt in characters
        #[arg(short, long, default_value = DEFAULT_SALT_LEN, value_parser = clap::value_parser!(u16).range(1..))]
        length: u16,

        /// Print `KEY=value`, with KEY from --env-key, instead of the bare
        /// value. Not available with --salts.
        #[arg(long)]
        export: bool,
    },
}

/// Execute a salt command
pub fn salt(source: &SourceArgs, args: SaltArgs) -> Result<ExitCode> {
    match args {
        SaltArgs::New { length } => {
            let salt = Salt::generate(length.into());
            println!("{}", String::from_utf8_lossy(salt.as_bytes()));
        }
        SaltArgs::Rotate {
            keep,
            length,
            export,
        } => {
            if export && source.salts.is_some() {
                bail!("--export names an environment variable and cannot be combined with --salts");
            }

            let current = source.salt_source()?.salt_list();
            let rotated = current.rotate(Salt::generate(length.into()), keep.into())?;
            tracing::info!(
                previous = current.len(),
                kept = rotated.len(),
                "rotated salt list"
            );

            // Raw bytes so salts that are not UTF-8 survive the round trip.
            let mut stdout = std::io::stdout().lock();
            if export {
                write!(stdout, "{}=", source.env_key)?;
            }
            stdout.write_all(&rotated.to_bytes())?;
            writeln!(stdout)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
