//! `xla-build build` command

use std::path::PathBuf;

use anyhow::Result;
use xla_build::ops::{build, BuildOptions};
use xla_build::BuildConfig;

use crate::cli::BuildArgs;

pub fn execute(root: Option<PathBuf>, args: BuildArgs) -> Result<()> {
    let ctx = super::context(root)?;
    let config = BuildConfig::resolve(ctx.base_dir());

    let opts = BuildOptions {
        jobs: args.jobs,
        emit_compile_commands: args.emit_compile_commands,
        build_mode: args.mode,
    };

    let outcome = build(&ctx, &config, &opts)?;

    eprintln!(
        "    Built {} ({})",
        outcome.extension.display(),
        outcome.version.version
    );

    Ok(())
}
