//! The build operation: the full pipeline from version resolution to the
//! linked extension module.
//!
//! Every stage is an explicit call in dependency order; nothing runs as a
//! side effect of loading anything. Order matters twice: code generation
//! must precede source discovery, and the external library build must
//! precede proto generation because protoc is one of its artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::compile::{compile_objects, link_extension, CompileStrategy};
use crate::builder::compile_commands::emit_compile_commands;
use crate::builder::driver::{extension_spec, glob_extension_sources, Platform};
use crate::builder::DRIVER_INTERFACE_VERSION;
use crate::pipeline;
use crate::util::process::find_cxx_compiler;
use crate::util::{BuildConfig, BuildContext};
use crate::version::{write_version_files, VersionInfo};

/// Options for one build invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Thread count override for parallel compilation.
    pub jobs: Option<usize>,
    /// Emit compile_commands.json into the build directory.
    pub emit_compile_commands: bool,
    /// Build-mode token forwarded to the external library build.
    pub build_mode: Option<String>,
}

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The linked extension module.
    pub extension: PathBuf,
    /// The resolved version descriptor.
    pub version: VersionInfo,
}

/// Name of the compiled extension module.
const EXTENSION_MODULE: &str = "_XLAC";

/// Run the whole build.
pub fn build(ctx: &BuildContext, config: &BuildConfig, opts: &BuildOptions) -> Result<BuildOutcome> {
    let version = VersionInfo::resolve(ctx.base_dir(), config)?;

    tracing::info!("building {} version: {}", config.package_name, version.version);
    tracing::info!("XLA commit ID: {}", version.xla_gitrev);
    tracing::info!("PyTorch commit ID: {}", version.torch_gitrev);

    write_version_files(ctx.base_dir(), &version)?;

    // Generate the code before globbing!
    pipeline::generate_aten_code(ctx)?;
    pipeline::build_extra_libraries(ctx, opts.build_mode.as_deref())?;
    pipeline::generate_protos(ctx)?;

    let sources = glob_extension_sources(ctx)?;
    let cc = std::env::var("CC").ok();
    let spec = extension_spec(ctx, config, sources, cc.as_deref(), Platform::current());

    let compiler = find_cxx_compiler().context("no C++ compiler found (set CXX or install one)")?;

    if opts.emit_compile_commands {
        emit_compile_commands(ctx, &spec, &compiler)?;
    }

    let strategy = CompileStrategy::select(config.compile_parallel, DRIVER_INTERFACE_VERSION);
    let objects = compile_objects(ctx, &spec, &compiler, strategy, opts.jobs)?;
    let extension = link_extension(ctx, &spec, &compiler, &objects, EXTENSION_MODULE)?;

    // The extension exists at this point; a test-build failure below is a
    // test-build failure, not an extension build failure.
    if config.build_cpp_tests {
        pipeline::build_cpp_tests(ctx)?;
    }

    Ok(BuildOutcome { extension, version })
}
