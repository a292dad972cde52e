use anyhow::Result;
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

mod cli;
mod executor;
mod filename;
mod index;
mod inventory;
mod manifest;
mod prompt;
mod reconcile;
mod references;
mod report;
mod workflow;

use cli::{Command, RootArgs};
use prompt::{LinePrompt, Preapproved};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.command.target().verbose);

    match args.command {
        Command::Check(args) => workflow::run_check(args),
        Command::Rename(args) => {
            let outcome = if args.yes {
                workflow::run_rename(args, &mut Preapproved(true))?
            } else {
                let mut prompt = LinePrompt::new(io::stdin().lock(), io::stdout());
                workflow::run_rename(args, &mut prompt)?
            };
            tracing::debug!(?outcome, "rename finished");
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays parseable in `--json` mode.
/// `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
