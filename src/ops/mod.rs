//! High-level operations

pub mod precompile;

pub use precompile::{arguments, compile_spec, precompile, PrecompileOptions};
