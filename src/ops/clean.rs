//! The clean operation.
//!
//! Build artifacts are whatever `.gitignore` says they are: each non-comment
//! line is a glob whose matches get removed. The `# BEGIN NOT-CLEAN-FILES`
//! marker truncates the scan; everything listed after it is ignored but not
//! a build artifact (editor droppings, local notes) and must survive.

use anyhow::Result;

use crate::util::fs::{read_to_string, remove_path_best_effort};
use crate::util::BuildContext;

/// Marker comment that ends the cleanable section of `.gitignore`.
const NOT_CLEAN_MARKER: &str = "BEGIN NOT-CLEAN-FILES";

/// Remove build artifacts listed in `.gitignore`, then the tool's own
/// output directory. Removal is best-effort per entry; a pattern matching
/// nothing or a path that is already gone is not an error.
pub fn clean(ctx: &BuildContext) -> Result<()> {
    let gitignore = ctx.base_dir().join(".gitignore");
    if gitignore.exists() {
        let ignores = read_to_string(&gitignore)?;
        for pattern in cleanable_patterns(&ignores) {
            remove_matches(ctx, pattern);
        }
    }

    remove_path_best_effort(&ctx.build_dir());
    tracing::info!("removed build artifacts");
    Ok(())
}

/// The globs to clean: non-empty, non-comment lines before the marker.
fn cleanable_patterns(ignores: &str) -> Vec<&str> {
    let mut patterns = Vec::new();
    for line in ignores.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if comment.trim_start().starts_with(NOT_CLEAN_MARKER) {
                break;
            }
            continue;
        }
        patterns.push(line);
    }
    patterns
}

fn remove_matches(ctx: &BuildContext, pattern: &str) {
    // Directory patterns may carry a trailing slash; match the directory
    // itself.
    let full = ctx.base_dir().join(pattern.trim_end_matches('/'));
    let Ok(entries) = glob::glob(&full.to_string_lossy()) else {
        tracing::warn!("skipping invalid clean pattern: {}", pattern);
        return;
    };
    for entry in entries.flatten() {
        tracing::debug!("removing {}", entry.display());
        remove_path_best_effort(&entry);
    }
}
