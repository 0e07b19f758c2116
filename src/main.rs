//! Command-line entry point for the vehicle documentation compiler.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
