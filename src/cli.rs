//! Command-line definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the carthage planner.
#[derive(Parser, Debug)]
#[command(
    name = "carthage",
    about = "Declarative configuration-management planner",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Path to the JSON unit configuration
    #[arg(long, global = true, env = "CARTHAGE_CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Directory every managed path is placed beneath (use / for a real run)
    #[arg(long, global = true, default_value = "/tmp/carthage")]
    pub sys_root: PathBuf,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print units in execution order
    Plan,
    /// Print the dependency tree
    Graph,
    /// Execute the plan against the system root
    Apply(ApplyOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Graph => "graph",
            Self::Apply(_) => "apply",
            Self::Version => "version",
        }
    }
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}
