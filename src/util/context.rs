//! Build context: the fixed path layout of a bridge checkout.
//!
//! Everything the pipeline touches hangs off the bridge root:
//!
//! ```text
//! <root>/
//!   scripts/generate_code.sh       code generation entry point
//!   build_torch_xla_libs.sh        external library build entry point
//!   test/cpp/run_tests.sh          C++ test build entry point
//!   third_party/                   external dependency checkouts/outputs
//!   torch_xla/                     the interpreted package
//!   torch_xla/csrc/                extension sources
//!   torch_xla/pb/src/              proto sources (optional)
//!   torch_xla/pb/cpp/              generated proto bindings
//!   torch_xla/lib/                 external shared libraries
//!   build/                         this tool's output directory
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

/// Paths for one build invocation, rooted at the bridge checkout.
#[derive(Debug, Clone)]
pub struct BuildContext {
    base_dir: PathBuf,
}

impl BuildContext {
    /// Create a context rooted at the given directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir
            .as_ref()
            .canonicalize()
            .with_context(|| {
                format!(
                    "bridge root does not exist: {}",
                    base_dir.as_ref().display()
                )
            })?;
        Ok(BuildContext { base_dir })
    }

    /// Context rooted at the current directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to determine current directory")?;
        Self::new(cwd)
    }

    /// The bridge checkout root.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// External dependency root.
    pub fn third_party_dir(&self) -> PathBuf {
        self.base_dir.join("third_party")
    }

    /// Directory holding the external shared libraries the extension links
    /// against.
    pub fn lib_dir(&self) -> PathBuf {
        self.base_dir.join("torch_xla").join("lib")
    }

    /// Extension source directory.
    pub fn csrc_dir(&self) -> PathBuf {
        self.base_dir.join("torch_xla").join("csrc")
    }

    /// Proto source directory (may not exist; not all checkouts ship protos).
    pub fn proto_src_dir(&self) -> PathBuf {
        self.base_dir.join("torch_xla").join("pb").join("src")
    }

    /// Output directory for generated proto bindings.
    pub fn proto_out_dir(&self) -> PathBuf {
        self.base_dir.join("torch_xla").join("pb").join("cpp")
    }

    /// This tool's output directory.
    pub fn build_dir(&self) -> PathBuf {
        self.base_dir.join("build")
    }

    /// Object file output directory.
    pub fn obj_dir(&self) -> PathBuf {
        self.build_dir().join("obj")
    }

    /// Host tensor-library source root: `PYTORCH_SOURCE_PATH` override or
    /// the parent of the bridge root (the layout of a side-by-side checkout).
    pub fn pytorch_source_path(&self, override_path: Option<&Path>) -> PathBuf {
        match override_path {
            Some(path) => path.to_path_buf(),
            None => self
                .base_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.base_dir.clone()),
        }
    }
}
