//! Invocation of an external command-line tool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::args::ArgsTransformer;
use crate::builder::errors::PrecompileError;
use crate::core::compile_spec::CompileSpec;
use crate::util::process::ProcessBuilder;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    Succeeded,
    /// The process ran and exited unsuccessfully.
    Failed { code: Option<i32> },
}

impl WorkResult {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkResult::Succeeded)
    }

    /// Turn a failed result into [`PrecompileError::CompileFailed`].
    pub fn check(self, name: &str) -> Result<(), PrecompileError> {
        match self {
            WorkResult::Succeeded => Ok(()),
            WorkResult::Failed { code } => Err(PrecompileError::CompileFailed {
                name: name.to_string(),
                code,
            }),
        }
    }
}

/// An executable bound to an argument transformer and a working directory.
///
/// Rebinding returns a new tool and leaves the original untouched, so one
/// configured tool can be shared by many compile specs.
#[derive(Clone)]
pub struct CommandLineTool {
    executable: PathBuf,
    work_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    transformer: Option<Arc<dyn ArgsTransformer>>,
}

impl CommandLineTool {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        CommandLineTool {
            executable: executable.into(),
            work_dir: None,
            env: Vec::new(),
            transformer: None,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// A copy of this tool bound to `transformer`.
    pub fn with_arguments(&self, transformer: Arc<dyn ArgsTransformer>) -> Self {
        CommandLineTool {
            transformer: Some(transformer),
            ..self.clone()
        }
    }

    /// A copy of this tool that runs in `dir`.
    pub fn in_work_directory(&self, dir: impl Into<PathBuf>) -> Self {
        CommandLineTool {
            work_dir: Some(dir.into()),
            ..self.clone()
        }
    }

    /// A copy of this tool with an extra environment variable.
    pub fn with_env(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut tool = self.clone();
        tool.env.push((key.into(), value.into()));
        tool
    }

    /// Run the tool for `spec` and wait for it to finish.
    ///
    /// A nonzero exit is a [`WorkResult::Failed`]; failing to start the
    /// process at all is an error. Response files created for the call are
    /// removed before this returns, whichever way it went.
    pub fn execute(&self, spec: &CompileSpec) -> Result<WorkResult, PrecompileError> {
        let transformer = self.transformer.as_ref().ok_or_else(|| {
            PrecompileError::invalid_spec(format!(
                "no argument transformer bound to `{}`",
                self.executable.display()
            ))
        })?;

        let args = transformer.transform(spec)?;

        let mut process = ProcessBuilder::new(&self.executable).args(args.tokens());
        for (key, value) in &self.env {
            process = process.env(key, value);
        }
        if let Some(ref dir) = self.work_dir {
            process = process.cwd(dir);
        }

        tracing::debug!("running `{}`", process.display_command());
        let status = process.status()?;
        drop(args);

        if status.success() {
            Ok(WorkResult::Succeeded)
        } else {
            tracing::debug!(
                "`{}` exited with {:?}",
                self.executable.display(),
                status.code()
            );
            Ok(WorkResult::Failed {
                code: status.code(),
            })
        }
    }
}

impl fmt::Debug for CommandLineTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLineTool")
            .field("executable", &self.executable)
            .field("work_dir", &self.work_dir)
            .field("env", &self.env)
            .field("bound", &self.transformer.is_some())
            .finish()
    }
}
