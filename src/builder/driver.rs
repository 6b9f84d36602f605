//! Compiler driver configuration.
//!
//! Pure computation of the include paths, library paths, compile flags, and
//! link flags the extension build consumes. Nothing here touches the
//! filesystem except source globbing; the configurator itself is a function
//! of context, configuration, and platform.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::glob_files;
use crate::util::{BuildConfig, BuildContext};

/// Subdirectories of `third_party/` holding headers for the external
/// dependencies (tensor-library build outputs, protobuf, Eigen, Abseil).
const THIRD_PARTY_INCLUDES: &[&str] = &[
    "tensorflow/bazel-tensorflow",
    "tensorflow/bazel-bin",
    "tensorflow/bazel-tensorflow/external/protobuf_archive/src",
    "tensorflow/bazel-tensorflow/external/com_google_protobuf/src",
    "tensorflow/bazel-tensorflow/external/eigen_archive",
    "tensorflow/bazel-tensorflow/external/com_google_absl",
];

/// Platform family, as far as linker flags care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Linux,
}

impl Platform {
    /// The platform this build is running on.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }
}

/// Relative runtime-library-search-path flag: both spellings resolve at
/// load time to the directory containing the loaded module, so the
/// extension finds its co-located shared libraries wherever it is
/// installed.
pub fn make_relative_rpath(path: &str, platform: Platform) -> String {
    match platform {
        Platform::Darwin => format!("-Wl,-rpath,@loader_path/{}", path),
        Platform::Linux => format!("-Wl,-rpath,$ORIGIN/{}", path),
    }
}

/// Everything the extension build needs to compile and link.
#[derive(Debug, Clone)]
pub struct ExtensionSpec {
    /// Sources to compile, sorted.
    pub sources: Vec<PathBuf>,
    /// Include directories.
    pub include_dirs: Vec<PathBuf>,
    /// Library directories.
    pub library_dirs: Vec<PathBuf>,
    /// Compile flags.
    pub cflags: Vec<String>,
    /// Link flags.
    pub ldflags: Vec<String>,
}

/// Discover the extension sources. Runs after code generation and proto
/// generation, both of which contribute files matched here.
pub fn glob_extension_sources(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    glob_files(
        ctx.base_dir(),
        &[
            "torch_xla/csrc/*.cpp",
            "torch_xla/csrc/ops/*.cpp",
            "torch_xla/pb/cpp/*.cc",
        ],
    )
}

/// Assemble the compiler invocation spec.
///
/// `cc` is the value of the `CC` environment variable, used only to detect
/// the clang driver and widen the warning silence list accordingly.
pub fn extension_spec(
    ctx: &BuildContext,
    config: &BuildConfig,
    sources: Vec<PathBuf>,
    cc: Option<&str>,
    platform: Platform,
) -> ExtensionSpec {
    let third_party = ctx.third_party_dir();
    let pytorch = ctx.pytorch_source_path(config.pytorch_source_path.as_deref());

    let mut include_dirs = vec![ctx.base_dir().to_path_buf()];
    include_dirs.extend(THIRD_PARTY_INCLUDES.iter().map(|p| third_party.join(p)));
    include_dirs.push(pytorch.clone());
    include_dirs.push(pytorch.join("torch/csrc"));
    include_dirs.push(pytorch.join("torch/lib/tmp_install/include"));

    let library_dirs = vec![ctx.lib_dir()];

    let mut cflags: Vec<String> = [
        "-std=c++14",
        "-Wno-sign-compare",
        "-Wno-deprecated-declarations",
        "-Wno-return-type",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if cc.is_some_and(|cc| cc.starts_with("clang")) {
        cflags.push("-Wno-macro-redefined".to_string());
        cflags.push("-Wno-return-std-move".to_string());
    }

    let mut ldflags = vec!["-lxla_computation_client".to_string()];

    if config.debug {
        cflags.push("-O0".to_string());
        cflags.push("-g".to_string());
        ldflags.push("-O0".to_string());
        ldflags.push("-g".to_string());
    } else {
        cflags.push("-DNDEBUG".to_string());
    }

    ldflags.push(make_relative_rpath("torch_xla/lib", platform));

    ExtensionSpec {
        sources,
        include_dirs,
        library_dirs,
        cflags,
        ldflags,
    }
}

/// Map a source file to its object file under the build's object directory,
/// mirroring the source's path relative to the bridge root. The mapping is
/// 1:1, so parallel compilation never writes the same path twice.
pub fn object_path(ctx: &BuildContext, source: &Path) -> PathBuf {
    let rel = source.strip_prefix(ctx.base_dir()).unwrap_or(source);
    let mut obj = ctx.obj_dir().join(rel);
    obj.set_extension("o");
    obj
}
