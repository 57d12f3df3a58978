//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::builder::errors::PrecompileError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    fn launch_error(&self, source: std::io::Error) -> PrecompileError {
        PrecompileError::ProcessLaunch {
            program: self.program.clone(),
            source,
        }
    }

    /// Execute with captured output and wait for completion.
    pub fn exec(&self) -> Result<Output, PrecompileError> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output().map_err(|e| self.launch_error(e))
    }

    /// Execute with inherited stdio and return the exit status.
    pub fn status(&self) -> Result<ExitStatus, PrecompileError> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());

        cmd.status().map_err(|e| self.launch_error(e))
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find a compiler able to precompile headers of the given kind.
///
/// Checks the environment variable (`CXX` or `CC`) first, then searches
/// PATH for the usual GCC-family driver names.
pub fn find_compiler(cxx: bool) -> Option<PathBuf> {
    let (var, candidates): (&str, &[&str]) = if cxx {
        ("CXX", &["c++", "g++", "clang++"])
    } else {
        ("CC", &["cc", "gcc", "clang"])
    };

    if let Ok(value) = std::env::var(var) {
        if let Some(path) = find_executable(&value) {
            return Some(path);
        }
        tracing::warn!("`{}` is set to `{}` but it was not found", var, value);
    }

    candidates.iter().find_map(|name| find_executable(name))
}
