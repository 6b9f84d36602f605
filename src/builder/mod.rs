//! Extension build: driver configuration, compilation, and linking.

pub mod compile;
pub mod compile_commands;
pub mod driver;

pub use compile::{CompileStrategy, DRIVER_INTERFACE_VERSION};
pub use driver::{ExtensionSpec, Platform};
