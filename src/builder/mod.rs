//! Argument composition and compiler invocation.

pub mod args;
pub mod errors;
pub mod tool;
pub mod toolchain;

pub use args::{
    ArgsAction, ArgsChain, ArgsTransformer, Arguments, OptionsFile, OptionsFileMode, UserArgs,
};
pub use errors::PrecompileError;
pub use tool::{CommandLineTool, WorkResult};
pub use toolchain::{GccHeaderPrecompileArgs, HeaderPrecompiler, OperatingSystem};
