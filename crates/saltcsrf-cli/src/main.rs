//! saltcsrf - operator CLI for salted anti-forgery tokens

mod cli;
mod commands;

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbosity());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            return report(anyhow::Error::new(err).context("failed to start the async runtime"))
        }
    };

    let result = runtime.block_on(cli.execute());

    // A timed-out validation leaves its derivation running on a blocking
    // thread. Exit without joining it so `--timeout-ms` bounds the whole run.
    runtime.shutdown_background();

    result.unwrap_or_else(report)
}

fn report(err: anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", style("error:").red().bold(), err);
    ExitCode::FAILURE
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn,saltcsrf=info,saltcsrf_core=info",
        1 => "info,saltcsrf=debug,saltcsrf_core=debug",
        _ => "trace",
    };

    // stdout carries command output, logs go to stderr
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
