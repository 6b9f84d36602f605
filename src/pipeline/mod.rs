//! External pipeline stages.
//!
//! Each stage shells out to a script or binary shipped with the checkout.
//! Stages are synchronous, never retried, and a non-zero exit from any of
//! them aborts the whole build with a message naming the failed command;
//! they are expensive, order-sensitive steps where a silent partial failure
//! would corrupt everything downstream.

pub mod codegen;
pub mod libs;
pub mod protos;

pub use codegen::generate_aten_code;
pub use cpp_tests::build_cpp_tests;
pub use libs::build_extra_libraries;
pub use protos::generate_protos;
