//! Compiler-family specific argument generation.
//!
//! Each family provides a base [`ArgsTransformer`](crate::builder::args::ArgsTransformer)
//! for precompiling headers and a precompiler that wires it into a
//! [`CommandLineTool`](crate::builder::tool::CommandLineTool). Only the GCC
//! family (gcc, g++, clang) is implemented.

mod gcc;

pub use gcc::{GccHeaderPrecompileArgs, HeaderPrecompiler};

/// Operating system the compiler runs on.
///
/// Injected into transformers instead of read from the environment, so
/// tests can simulate any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingSystem {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl OperatingSystem {
    /// The host this binary was built for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => OperatingSystem::Linux,
            "macos" => OperatingSystem::MacOs,
            "windows" => OperatingSystem::Windows,
            _ => OperatingSystem::Other,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, OperatingSystem::Windows)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Linux => "linux",
            OperatingSystem::MacOs => "macos",
            OperatingSystem::Windows => "windows",
            OperatingSystem::Other => "other",
        }
    }
}

impl Default for OperatingSystem {
    fn default() -> Self {
        Self::current()
    }
}
