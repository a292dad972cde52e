//! CLI argument parsing for the reconcile workflow.
//!
//! The CLI only wires inputs: which directory, which manifest, extra names
//! to leave alone. All classification lives in the core modules.
use crate::manifest::DEFAULT_MANIFEST;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "cavrec",
    version,
    about = "Reconcile a directory's files against a cave.json manifest",
    after_help = "Commands:\n  check   Report files missing from disk or not referenced by the manifest\n  rename  Preview and apply renames that fix stale channel/user ids\n\nExamples:\n  cavrec check\n  cavrec check --dir /data/cave --json\n  cavrec rename --dry-run\n  cavrec rename --yes",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Check(CheckArgs),
    Rename(RenameArgs),
}

/// Inputs shared by every command.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Directory holding the manifest and its files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Manifest path; relative paths resolve against --dir
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Additional file names to leave out of the comparison (repeatable)
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Emit debug logging on stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Check command inputs.
#[derive(Parser, Debug)]
#[command(about = "Compare manifest file references with the directory contents")]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Rename command inputs.
#[derive(Parser, Debug)]
#[command(about = "Rename files whose channel/user ids disagree with the manifest")]
pub struct RenameArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Apply the plan without prompting
    #[arg(long, conflicts_with = "dry_run")]
    pub yes: bool,

    /// Show the plan and exit without renaming
    #[arg(long)]
    pub dry_run: bool,
}

impl Command {
    pub fn target(&self) -> &TargetArgs {
        match self {
            Command::Check(args) => &args.target,
            Command::Rename(args) => &args.target,
        }
    }
}
