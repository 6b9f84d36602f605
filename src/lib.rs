//! xla-build - build orchestrator for the PyTorch/XLA native extension.
//!
//! This crate drives the whole extension build: version stamping, code
//! generation, the external accelerator-compiler library build, proto
//! binding generation, and the parallel compile and link of the shared
//! extension module.

pub mod builder;
pub mod ops;
pub mod pipeline;
pub mod util;
pub mod version;

pub use builder::{CompileStrategy, ExtensionSpec};
pub use util::{BuildConfig, BuildContext};
pub use version::VersionInfo;
