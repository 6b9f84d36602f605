//! `xla-build clean` command

use std::path::PathBuf;

use anyhow::Result;
use xla_build::ops::clean;

use crate::cli::CleanArgs;

pub fn execute(root: Option<PathBuf>, _args: CleanArgs) -> Result<()> {
    let ctx = super::context(root)?;
    clean(&ctx)
}
