//! Compilation and linking of the extension.
//!
//! Compilation is a strategy injected into the build: sequential, or
//! parallel across a rayon pool sized to the logical processor count. The
//! two produce identical object sets; the only shared state the parallel
//! tasks touch is the filesystem, and the source-to-object mapping is 1:1
//! so no two tasks write the same path.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use rayon::prelude::*;

use crate::builder::driver::{object_path, ExtensionSpec};
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;
use crate::util::BuildContext;

/// Interface version of the compile driver.
///
/// Parallel dispatch assumes the per-unit contract of this driver version;
/// a caller requesting parallelism against a different version gets the
/// sequential strategy instead of a silently wrong build.
pub const DRIVER_INTERFACE_VERSION: u32 = 1;

/// How translation units are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStrategy {
    Sequential,
    Parallel,
}

impl CompileStrategy {
    /// Select the strategy: parallel only when requested and the driver
    /// interface version matches the one this strategy was written against.
    pub fn select(parallel_requested: bool, driver_version: u32) -> Self {
        if !parallel_requested {
            return CompileStrategy::Sequential;
        }
        if driver_version != DRIVER_INTERFACE_VERSION {
            tracing::debug!(
                driver_version,
                supported = DRIVER_INTERFACE_VERSION,
                "driver interface mismatch, compiling sequentially"
            );
            return CompileStrategy::Sequential;
        }
        CompileStrategy::Parallel
    }
}

/// Compile every source in the spec, returning the produced object files in
/// source order. An empty source set produces an empty object list.
pub fn compile_objects(
    ctx: &BuildContext,
    spec: &ExtensionSpec,
    compiler: &Path,
    strategy: CompileStrategy,
    jobs: Option<usize>,
) -> Result<Vec<PathBuf>> {
    let units: Vec<(PathBuf, PathBuf)> = spec
        .sources
        .iter()
        .map(|src| (src.clone(), object_path(ctx, src)))
        .collect();

    if units.is_empty() {
        return Ok(Vec::new());
    }

    tracing::info!("compiling {} files", units.len());

    match strategy {
        CompileStrategy::Sequential => {
            for (source, object) in &units {
                compile_one(spec, compiler, source, object)?;
            }
        }
        CompileStrategy::Parallel => {
            if let Some(j) = jobs {
                // Ignored if a global pool already exists.
                rayon::ThreadPoolBuilder::new()
                    .num_threads(j)
                    .build_global()
                    .ok();
            }

            let results: Vec<Result<()>> = units
                .par_iter()
                .map(|(source, object)| compile_one(spec, compiler, source, object))
                .collect();

            for result in results {
                result?;
            }
        }
    }

    Ok(units.into_iter().map(|(_, object)| object).collect())
}

/// Compile a single translation unit.
fn compile_one(
    spec: &ExtensionSpec,
    compiler: &Path,
    source: &Path,
    object: &Path,
) -> Result<()> {
    if let Some(parent) = object.parent() {
        ensure_dir(parent)?;
    }

    let cmd = compile_command(spec, compiler, source, object);

    tracing::debug!("compiling {} -> {}", source.display(), object.display());

    let output = cmd.exec()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("compilation failed for {}\n{}", source.display(), stderr);
    }
    Ok(())
}

/// Build the compile command for one translation unit.
pub fn compile_command(
    spec: &ExtensionSpec,
    compiler: &Path,
    source: &Path,
    object: &Path,
) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(compiler).arg("-c").arg("-fPIC");
    for dir in &spec.include_dirs {
        cmd = cmd.arg(format!("-I{}", dir.display()));
    }
    cmd = cmd.args(&spec.cflags);
    cmd.arg(source).arg("-o").arg(object)
}

/// Link the objects into the shared extension module under `build/lib`.
pub fn link_extension(
    ctx: &BuildContext,
    spec: &ExtensionSpec,
    compiler: &Path,
    objects: &[PathBuf],
    module_name: &str,
) -> Result<PathBuf> {
    let out_dir = ctx.build_dir().join("lib");
    ensure_dir(&out_dir)?;
    let output = out_dir.join(format!("{}.so", module_name));

    let mut cmd = ProcessBuilder::new(compiler).arg("-shared");
    cmd = cmd.args(objects);
    for dir in &spec.library_dirs {
        cmd = cmd.arg(format!("-L{}", dir.display()));
    }
    cmd = cmd.args(&spec.ldflags);
    cmd = cmd.arg("-o").arg(&output);

    tracing::info!("linking {}", output.display());

    let out = cmd.exec()?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        bail!("linking failed for {}\n{}", output.display(), stderr);
    }

    Ok(output)
}
