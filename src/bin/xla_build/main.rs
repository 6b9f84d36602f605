//! xla-build CLI - build orchestrator for the PyTorch/XLA native extension

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("xla_build=debug")
    } else {
        EnvFilter::new("xla_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(cli.root, args),
        Commands::Clean(args) => commands::clean::execute(cli.root, args),
    }
}
