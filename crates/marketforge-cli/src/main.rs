//! marketforge - batch runner for market stand allocation
//!
//! Reads a market snapshot as JSON, runs one allocation and writes the
//! output document. Progress goes to stderr; documents go to stdout or a file.

use anyhow::Result;
use clap::Parser;

mod commands;
mod error;
mod files;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
