//! Harmony: agent, resource and task registry CLI.
//!
//! # Usage
//!
//! ```text
//! harmony agent register <id> --name <name> --type human|ai [--capability C]...
//! harmony agent list [--type T] [--status S] [--json]
//! harmony resource allocate <id> --name <name> --type <type> --owner <agent> [--unchecked]
//! harmony task create <id> --title <title> [--priority P]
//! harmony task assign <task> <agent> [--unchecked]
//! harmony status [--json]
//! ```
//!
//! Every command loads the state snapshot (`--state`, `$HARMONY_STATE`, or
//! `~/.harmony/state.yaml`), applies one operation and saves on change.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    agent::AgentCommand, resource::ResourceCommand, status::StatusArgs, task::TaskCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "harmony",
    version,
    about = "Track agents, the resources they own, and the tasks assigned to them",
    long_about = None,
)]
struct Cli {
    /// Snapshot file to load and save. Defaults to ~/.harmony/state.yaml.
    #[arg(long, global = true, env = "HARMONY_STATE", value_name = "PATH")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register, inspect and update agents.
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Allocate, inspect and release resources.
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Create, assign and track tasks.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Show status counts and dangling agent references.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let state = cli.state;
    match cli.command {
        Commands::Agent { command } => commands::agent::run(state, command),
        Commands::Resource { command } => commands::resource::run(state, command),
        Commands::Task { command } => commands::task::run(state, command),
        Commands::Status(args) => args.run(state),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
