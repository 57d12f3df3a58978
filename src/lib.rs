//! Precomp - precompiled header management for GCC-family compilers
//!
//! This crate tracks named precompiled header declarations and turns each
//! one into an exact compiler invocation through a chain of argument
//! transformers.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use crate::builder::{
    ArgsTransformer, CommandLineTool, HeaderPrecompiler, OperatingSystem, PrecompileError,
    WorkResult,
};
pub use crate::core::{CompileSpec, Macro, PrecompiledHeader, PrecompiledHeaderContainer};
