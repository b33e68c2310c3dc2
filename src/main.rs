//! Binary entry point for gw-search.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::Context;
use clap::Parser;
use gw_search::cli::output::{format_error, is_broken_pipe};
use gw_search::cli::{Cli, execute};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(execute(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        // Output piped into e.g. `head` and closed early
        Err(e) if is_broken_pipe(&e) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", format_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins over the verbosity flag when set.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_directive = if verbose {
        "gw_search=debug"
    } else {
        "gw_search=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")
}
