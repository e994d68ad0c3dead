//! CLI argument parsing

use crate::commands::{self, GenerateArgs, SaltArgs, ValidateArgs};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use saltcsrf_core::{CsrfGuard, EnvSaltSource, SaltList, SaltSource, DEFAULT_SALTS_ENV_KEY};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// saltcsrf - issue and verify salted anti-forgery tokens
#[derive(Parser, Debug)]
#[command(name = "saltcsrf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a new token and its hash under the current salt
    Generate(GenerateArgs),

    /// Check a token against its hash using every configured salt
    Validate(ValidateArgs),

    /// Provision and rotate salts
    #[command(subcommand)]
    Salt(SaltArgs),

    /// Inspect the salt configuration for common mistakes
    Doctor,
}

/// Where salts come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Environment variable holding the comma-separated salt list
    #[arg(long, global = true, env = "SALTCSRF_ENV_KEY", default_value = DEFAULT_SALTS_ENV_KEY)]
    pub env_key: String,

    /// Use this comma-separated salt list instead of the environment.
    /// Visible in the process list, prefer the environment outside of testing.
    #[arg(long, global = true)]
    pub salts: Option<String>,

    /// Load variables from this file before reading salts (default: ./.env if present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
}

impl SourceArgs {
    /// Human-readable name of the salt source.
    pub fn describe(&self) -> String {
        match self.salts {
            Some(_) => "--salts".to_string(),
            None => format!("${}", self.env_key),
        }
    }

    /// Build the salt source, loading any env file first.
    pub fn salt_source(&self) -> Result<Arc<dyn SaltSource>> {
        match &self.env_file {
            Some(path) => saltcsrf_core::load_dotenv_from(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?,
            None => saltcsrf_core::load_dotenv(),
        }

        let source: Arc<dyn SaltSource> = match &self.salts {
            Some(value) => Arc::new(SaltList::parse(value)),
            None => Arc::new(EnvSaltSource::new(self.env_key.clone())),
        };
        Ok(source)
    }

    /// Build a guard over the configured salt source.
    pub fn guard(&self) -> Result<CsrfGuard<Arc<dyn SaltSource>>> {
        Ok(CsrfGuard::new(self.salt_source()?))
    }
}

impl Cli {
    /// Requested log verbosity
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<ExitCode> {
        match self.command {
            Commands::Generate(args) => commands::generate(&self.source, args),
            Commands::Validate(args) => commands::validate(&self.source, args).await,
            Commands::Salt(args) => commands::salt(&self.source, args),
            Commands::Doctor => commands::doctor(&self.source),
        }
    }
}
