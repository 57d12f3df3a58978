//! Precompile error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error while composing arguments for, or running, a precompile.
#[derive(Debug, Error)]
pub enum PrecompileError {
    #[error("invalid compile spec: {reason}")]
    InvalidSpec { reason: String },

    #[error("failed to launch `{}`", .program.display())]
    ProcessLaunch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("precompiling `{name}` failed{}", exit_code_suffix(.code))]
    CompileFailed { name: String, code: Option<i32> },

    #[error("failed to write options file in {}", .path.display())]
    OptionsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PrecompileError {
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        PrecompileError::InvalidSpec {
            reason: reason.into(),
        }
    }

    /// True when the compiler could not be started at all.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, PrecompileError::ProcessLaunch { .. })
    }
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_failed_message() {
        let err = PrecompileError::CompileFailed {
            name: "core".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "precompiling `core` failed with exit code 1");

        let err = PrecompileError::CompileFailed {
            name: "core".to_string(),
            code: None,
        };
        assert!(err.to_string().ends_with("(terminated by signal)"));
    }

    #[test]
    fn test_launch_failure_is_distinguishable() {
        let err = PrecompileError::ProcessLaunch {
            program: PathBuf::from("g++"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.is_launch_failure());
        assert!(!PrecompileError::invalid_spec("x").is_launch_failure());
    }
}
