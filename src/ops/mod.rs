//! Top-level operations invoked by the CLI.

pub mod build;
pub mod clean;

pub use build::{build, BuildOptions, BuildOutcome};
pub use clean::clean;
