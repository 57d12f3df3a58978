//! GCC/Clang header precompilation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::args::{
    path_token, ArgsAction, ArgsChain, ArgsTransformer, Arguments, OptionsFileMode,
};
use crate::builder::errors::PrecompileError;
use crate::builder::tool::{CommandLineTool, WorkResult};
use crate::core::compile_spec::CompileSpec;

use super::OperatingSystem;

/// Base arguments for precompiling headers with a GCC-style driver.
///
/// Produces, in order: the `-x` language selection, one `-D` per macro,
/// the spec's extra arguments, `-c`, `-fPIC` (when requested, except on
/// Windows), one `-I <dir>` pair per include root and finally the headers.
#[derive(Debug, Clone)]
pub struct GccHeaderPrecompileArgs {
    os: OperatingSystem,
}

impl GccHeaderPrecompileArgs {
    pub fn new(os: OperatingSystem) -> Self {
        GccHeaderPrecompileArgs { os }
    }
}

impl Default for GccHeaderPrecompileArgs {
    fn default() -> Self {
        Self::new(OperatingSystem::current())
    }
}

impl ArgsTransformer for GccHeaderPrecompileArgs {
    fn transform(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
        if spec.headers.is_empty() {
            return Err(PrecompileError::invalid_spec("no headers to precompile"));
        }

        let mut args = vec!["-x".to_string(), spec.language.header_flag_value().to_string()];

        // Macros
        args.extend(spec.macros.iter().map(|m| m.to_flag()));

        // Pass-through arguments
        args.extend(spec.args.iter().cloned());

        // Compile only
        args.push("-c".to_string());

        // Never on Windows hosts
        if spec.position_independent_code && !self.os.is_windows() {
            args.push("-fPIC".to_string());
        }

        // Include directories
        for dir in &spec.include_roots {
            args.push("-I".to_string());
            args.push(absolute(dir)?);
        }

        // Headers
        for header in &spec.headers {
            args.push(absolute(header)?);
        }

        Ok(Arguments::new(args))
    }
}

fn absolute(path: &Path) -> Result<String, PrecompileError> {
    let abs = std::path::absolute(path).map_err(|e| {
        PrecompileError::invalid_spec(format!("bad path `{}`: {}", path.display(), e))
    })?;
    path_token(&abs)
}

/// Precompiles headers with a GCC-family compiler.
///
/// Assembles the argument chain once (base, user args, optional options
/// file) and binds it to the tool. Each call to [`execute`](Self::execute)
/// runs the tool in the spec's output directory.
#[derive(Clone)]
pub struct HeaderPrecompiler {
    tool: CommandLineTool,
    transformer: Arc<dyn ArgsTransformer>,
}

impl HeaderPrecompiler {
    /// Create a precompiler for the current host.
    ///
    /// `use_options_file` routes every invocation through a response file.
    pub fn new(tool: CommandLineTool, args_action: ArgsAction, use_options_file: bool) -> Self {
        let mode = use_options_file.then_some(OptionsFileMode::Always);
        Self::with_settings(tool, args_action, mode, OperatingSystem::current())
    }

    /// Create a precompiler with an explicit options file mode and host OS.
    pub fn with_settings(
        tool: CommandLineTool,
        args_action: ArgsAction,
        options_file: Option<OptionsFileMode>,
        os: OperatingSystem,
    ) -> Self {
        let transformer = ArgsChain::new(GccHeaderPrecompileArgs::new(os))
            .with_user_args(args_action)
            .with_options_file(options_file)
            .build();

        HeaderPrecompiler {
            tool: tool.with_arguments(transformer.clone()),
            transformer,
        }
    }

    /// The compiler this precompiler runs.
    pub fn compiler(&self) -> &Path {
        self.tool.executable()
    }

    /// Compose the arguments for `spec` without running anything.
    pub fn arguments(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
        self.transformer.transform(spec)
    }

    /// Precompile the headers in `spec`.
    pub fn execute(&self, spec: &CompileSpec) -> Result<WorkResult, PrecompileError> {
        let out_dir = output_dir(spec)?;
        std::fs::create_dir_all(&out_dir).map_err(|source| PrecompileError::OutputDir {
            path: out_dir.clone(),
            source,
        })?;

        tracing::info!(
            "precompiling {} header(s) into {}",
            spec.headers.len(),
            out_dir.display()
        );
        self.tool.in_work_directory(out_dir).execute(spec)
    }
}

impl fmt::Debug for HeaderPrecompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderPrecompiler")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

fn output_dir(spec: &CompileSpec) -> Result<PathBuf, PrecompileError> {
    if spec.object_file_dir.as_os_str().is_empty() {
        return Err(PrecompileError::invalid_spec("no output directory"));
    }
    Ok(spec.object_file_dir.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::args::parse_options_file;
    use crate::core::compile_spec::{Language, Macro};
    use tempfile::TempDir;

    fn transform(os: OperatingSystem, spec: &CompileSpec) -> Vec<String> {
        GccHeaderPrecompileArgs::new(os)
            .transform(spec)
            .unwrap()
            .tokens()
            .to_vec()
    }

    fn no_user_args() -> ArgsAction {
        Arc::new(|_: &mut Vec<String>| {})
    }

    #[test]
    fn test_end_to_end_sequence() {
        let spec = CompileSpec::new("/src/pch.h", "/out").arg("-O2");

        assert_eq!(
            transform(OperatingSystem::Linux, &spec),
            vec!["-x", "c++-header", "-O2", "-c", "/src/pch.h"]
        );
    }

    #[test]
    fn test_macro_order() {
        let spec = CompileSpec::new("/src/pch.h", "/out")
            .define(Macro::flag("A"))
            .define(Macro::key_value("B", "2"));

        let args = transform(OperatingSystem::Linux, &spec);
        assert_eq!(&args[2..4], ["-DA", "-DB=2"]);
    }

    #[test]
    fn test_include_order() {
        let spec = CompileSpec::new("/src/pch.h", "/out")
            .include("/a")
            .include("/b");

        let args = transform(OperatingSystem::Linux, &spec);
        assert_eq!(&args[3..7], ["-I", "/a", "-I", "/b"]);
        assert_eq!(args.last().unwrap(), "/src/pch.h");
    }

    #[test]
    fn test_relative_paths_made_absolute() {
        let spec = CompileSpec::new("include/pch.h", "/out").include("include");
        let cwd = std::env::current_dir().unwrap();

        let args = transform(OperatingSystem::Linux, &spec);
        assert_eq!(args[4], cwd.join("include").display().to_string());
        assert_eq!(args[5], cwd.join("include/pch.h").display().to_string());
    }

    #[test]
    fn test_pic_suppressed_on_windows() {
        let spec = CompileSpec::new("/src/pch.h", "/out").pic(true);

        assert!(!transform(OperatingSystem::Windows, &spec).contains(&"-fPIC".to_string()));

        let args = transform(OperatingSystem::Linux, &spec);
        assert_eq!(args, vec!["-x", "c++-header", "-c", "-fPIC", "/src/pch.h"]);
        assert!(transform(OperatingSystem::MacOs, &spec).contains(&"-fPIC".to_string()));
    }

    #[test]
    fn test_c_header_language() {
        let spec = CompileSpec::new("/src/pch.h", "/out").language(Language::C);
        assert_eq!(&transform(OperatingSystem::Linux, &spec)[..2], ["-x", "c-header"]);
    }

    #[test]
    fn test_multiple_headers_in_order() {
        let spec = CompileSpec::new("/src/a.h", "/out").header("/src/b.h");
        let args = transform(OperatingSystem::Linux, &spec);
        assert_eq!(&args[args.len() - 2..], ["/src/a.h", "/src/b.h"]);
    }

    #[test]
    fn test_no_headers_is_invalid() {
        let spec = CompileSpec {
            object_file_dir: PathBuf::from("/out"),
            ..Default::default()
        };
        let err = GccHeaderPrecompileArgs::new(OperatingSystem::Linux)
            .transform(&spec)
            .unwrap_err();
        assert!(matches!(err, PrecompileError::InvalidSpec { .. }));
    }

    #[test]
    fn test_user_args_follow_base_args() {
        let pre = HeaderPrecompiler::with_settings(
            CommandLineTool::new("g++"),
            Arc::new(|args: &mut Vec<String>| args.push("--extra".to_string())),
            None,
            OperatingSystem::Linux,
        );
        let spec = CompileSpec::new("/src/pch.h", "/out")
            .define(Macro::flag("A"))
            .include("/inc");

        let args = pre.arguments(&spec).unwrap();
        assert_eq!(
            args.tokens(),
            ["-x", "c++-header", "-DA", "-c", "-I", "/inc", "/src/pch.h", "--extra"]
        );
    }

    #[test]
    fn test_options_file_chain() {
        let tmp = TempDir::new().unwrap();
        let pre = HeaderPrecompiler::with_settings(
            CommandLineTool::new("g++"),
            no_user_args(),
            Some(OptionsFileMode::Always),
            OperatingSystem::Linux,
        );
        let spec = CompileSpec::new("/src/pch.h", tmp.path()).arg("-O2");

        let args = pre.arguments(&spec).unwrap();
        assert_eq!(args.len(), 1);
        let path = args.tokens()[0].strip_prefix('@').unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            parse_options_file(&contents),
            vec!["-x", "c++-header", "-O2", "-c", "/src/pch.h"]
        );
    }

    #[test]
    fn test_execute_requires_output_dir() {
        let pre = HeaderPrecompiler::new(CommandLineTool::new("true"), no_user_args(), false);
        let spec = CompileSpec {
            headers: vec![PathBuf::from("/src/pch.h")],
            ..Default::default()
        };

        assert!(matches!(
            pre.execute(&spec),
            Err(PrecompileError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_execute_output_dir_under_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let pre = HeaderPrecompiler::new(CommandLineTool::new("true"), no_user_args(), false);
        let spec = CompileSpec::new("/src/pch.h", blocker.join("out"));

        match pre.execute(&spec) {
            Err(PrecompileError::OutputDir { path, .. }) => assert_eq!(path, blocker.join("out")),
            other => panic!("expected OutputDir error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_header_is_invalid() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let header = PathBuf::from(OsStr::from_bytes(b"/src/p\xffch.h"));
        let spec = CompileSpec::new(header, "/out");

        let err = GccHeaderPrecompileArgs::new(OperatingSystem::Linux)
            .transform(&spec)
            .unwrap_err();
        assert!(matches!(err, PrecompileError::InvalidSpec { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_include_root_is_invalid() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let spec = CompileSpec::new("/src/pch.h", "/out")
            .include(PathBuf::from(OsStr::from_bytes(b"/inc\xfe")));

        assert!(matches!(
            GccHeaderPrecompileArgs::new(OperatingSystem::Linux).transform(&spec),
            Err(PrecompileError::InvalidSpec { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_creates_output_dir() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("pch").join("core");
        let pre = HeaderPrecompiler::new(CommandLineTool::new("true"), no_user_args(), true);
        let spec = CompileSpec::new("/src/pch.h", &out);

        assert_eq!(pre.execute(&spec).unwrap(), WorkResult::Succeeded);
        assert!(out.is_dir());
        // Options file cleaned up
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_runs_in_output_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("pch.h"), "").unwrap();

        // `test -x c++-header ...` is not valid, so swap the args for a file check
        let pre = HeaderPrecompiler::new(
            CommandLineTool::new("test"),
            Arc::new(|args: &mut Vec<String>| {
                args.clear();
                args.extend(["-f".to_string(), "pch.h".to_string()]);
            }),
            false,
        );
        let spec = CompileSpec::new("/src/pch.h", tmp.path());

        assert!(pre.execute(&spec).unwrap().is_success());
    }
}
