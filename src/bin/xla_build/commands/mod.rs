//! Command implementations.

pub mod build;
pub mod clean;

use std::path::PathBuf;

use anyhow::Result;
use xla_build::BuildContext;

/// Build the context from the `--root` flag or the current directory.
pub fn context(root: Option<PathBuf>) -> Result<BuildContext> {
    match root {
        Some(root) => BuildContext::new(root),
        None => BuildContext::from_cwd(),
    }
}
