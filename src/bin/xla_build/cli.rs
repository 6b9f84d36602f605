//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// xla-build - build orchestrator for the PyTorch/XLA native extension
#[derive(Parser)]
#[command(name = "xla-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bridge checkout root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the extension module
    Build(BuildArgs),

    /// Remove build artifacts listed in .gitignore
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Number of parallel compile jobs (defaults to the logical CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Emit compile_commands.json into the build directory
    #[arg(long)]
    pub emit_compile_commands: bool,

    /// Build-mode token forwarded to the external library build
    #[arg(long)]
    pub mode: Option<String>,
}

#[derive(Args)]
pub struct CleanArgs {}
