//! CLI commands.

mod allocate;
mod audit;
mod check;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use marketforge::{EngineConfig, EnvironmentMode};

use crate::files::load_config;

/// marketforge - Allocate market stands from a snapshot.
#[derive(Debug, Parser)]
#[command(name = "marketforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Suppress progress output on stderr.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Skip the startup banner.
    #[arg(long, global = true, env = "MARKETFORGE_NO_BANNER")]
    no_banner: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one allocation and write the output document.
    Allocate(allocate::AllocateCommand),

    /// Run one allocation and print the decision trail.
    Audit(audit::AuditCommand),

    /// Validate a snapshot without allocating.
    Check(check::CheckCommand),
}

/// Input options shared by commands that run the engine.
#[derive(Debug, Args)]
struct JobArgs {
    /// Market snapshot (JSON); `-` reads stdin.
    #[arg(long, short, default_value = "-")]
    input: PathBuf,

    /// Engine configuration (TOML, or YAML by extension).
    #[arg(long, short, env = "MARKETFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Re-check bookkeeping invariants after every phase.
    #[arg(long)]
    full_assert: bool,
}

impl JobArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let config = load_config(self.config.as_ref())?;
        Ok(if self.full_assert {
            config.with_environment_mode(EnvironmentMode::FullAssert)
        } else {
            config
        })
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if !self.quiet {
            marketforge::console::init_with(!self.no_banner);
        }

        match self.command {
            Commands::Allocate(cmd) => cmd.run(),
            Commands::Audit(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
        }
    }
}
