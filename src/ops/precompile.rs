//! Precompile operations over a manifest.
//!
//! Turns manifest declarations into compile specs and drives a
//! [`HeaderPrecompiler`] for each one, sequentially.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::builder::args::{ArgsAction, OptionsFileMode};
use crate::builder::tool::CommandLineTool;
use crate::builder::toolchain::{HeaderPrecompiler, OperatingSystem};
use crate::core::compile_spec::{CompileSpec, Language};
use crate::core::manifest::Manifest;
use crate::core::pch::PrecompiledHeader;
use crate::util::config::Config;
use crate::util::process::find_compiler;

/// Default output root, relative to the manifest directory.
pub const DEFAULT_TARGET_DIR: &str = "target/pch";

/// Options for precompile operations.
#[derive(Debug, Clone)]
pub struct PrecompileOptions {
    /// Explicit compiler, overriding config and detection
    pub compiler: Option<PathBuf>,
    /// Response file mode, `None` to pass arguments directly
    pub options_file: Option<OptionsFileMode>,
    /// Arguments appended after the generated ones
    pub user_args: Vec<String>,
    /// Output root for declarations without an explicit output dir
    pub target_dir: PathBuf,
    /// Compiler overrides from config
    pub cxx: Option<PathBuf>,
    pub cc: Option<PathBuf>,
    /// Host OS the compiler runs on
    pub os: OperatingSystem,
}

impl PrecompileOptions {
    /// Options derived from configuration, rooted at the manifest directory.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        let target_dir = config
            .precompile
            .target_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR));

        PrecompileOptions {
            compiler: None,
            options_file: config.options_file_mode(),
            user_args: config.precompile.args.clone(),
            target_dir: root.join(target_dir),
            cxx: config.toolchain.cxx.clone(),
            cc: config.toolchain.cc.clone(),
            os: OperatingSystem::current(),
        }
    }

    /// The compiler to use for headers of `language`.
    pub fn compiler_for(&self, language: Language) -> Result<PathBuf> {
        if let Some(ref compiler) = self.compiler {
            return Ok(compiler.clone());
        }

        let configured = match language {
            Language::Cxx => &self.cxx,
            Language::C => &self.cc,
        };
        if let Some(compiler) = configured {
            return Ok(compiler.clone());
        }

        match find_compiler(language == Language::Cxx) {
            Some(path) => Ok(path),
            None => bail!(
                "no {} compiler found\n\
                 help: Set `{}` or pass `--compiler <PATH>`",
                language.as_str(),
                if language == Language::Cxx { "CXX" } else { "CC" }
            ),
        }
    }

    fn user_args_action(&self) -> ArgsAction {
        let extra = self.user_args.clone();
        Arc::new(move |args: &mut Vec<String>| args.extend(extra.iter().cloned()))
    }

    /// Build the precompiler for `language`.
    pub fn precompiler(&self, language: Language) -> Result<HeaderPrecompiler> {
        let compiler = self.compiler_for(language)?;
        tracing::debug!("using {} compiler {}", language.as_str(), compiler.display());

        Ok(HeaderPrecompiler::with_settings(
            CommandLineTool::new(compiler),
            self.user_args_action(),
            self.options_file,
            self.os,
        ))
    }
}

/// Build the compile spec for a declaration.
pub fn compile_spec(pch: &PrecompiledHeader, target_dir: &Path) -> CompileSpec {
    CompileSpec {
        language: pch.language,
        macros: pch.macros.clone(),
        include_roots: pch.include_dirs.clone(),
        headers: pch.headers.clone(),
        object_file_dir: pch.output_dir_in(target_dir),
        temp_dir: None,
        position_independent_code: pch.pic,
        args: pch.args.clone(),
    }
}

/// Declarations selected by name, or all of them when `names` is empty.
fn select<'a>(manifest: &'a Manifest, names: &[String]) -> Result<Vec<&'a PrecompiledHeader>> {
    if names.is_empty() {
        return Ok(manifest.headers().iter().collect());
    }

    names
        .iter()
        .map(|name| manifest.headers().find(name).map_err(anyhow::Error::from))
        .collect()
}

/// Precompile the selected declarations, stopping at the first failure.
///
/// Returns the names that were precompiled.
pub fn precompile(
    manifest: &Manifest,
    names: &[String],
    opts: &PrecompileOptions,
) -> Result<Vec<String>> {
    let selected = select(manifest, names)?;
    if selected.is_empty() {
        tracing::warn!("no precompiled headers declared");
    }

    let mut built = Vec::new();
    for pch in selected {
        let spec = compile_spec(pch, &opts.target_dir);
        let precompiler = opts.precompiler(pch.language)?;

        tracing::info!("Precompiling `{}`", pch.name());
        precompiler
            .execute(&spec)
            .and_then(|result| result.check(pch.name()))
            .with_context(|| format!("failed to precompile `{}`", pch.name()))?;

        built.push(pch.name().to_string());
    }

    Ok(built)
}

/// The argument list the compiler would receive for a declaration.
///
/// Response files are never used here so the full list is visible.
pub fn arguments(
    manifest: &Manifest,
    name: &str,
    opts: &PrecompileOptions,
) -> Result<Vec<String>> {
    let pch = manifest.headers().find(name)?;
    let spec = compile_spec(pch, &opts.target_dir);

    // Nothing is executed, so any compiler name will do
    let opts = PrecompileOptions {
        options_file: None,
        compiler: Some(opts.compiler.clone().unwrap_or_else(|| PathBuf::from("cc"))),
        ..opts.clone()
    };
    let args = opts.precompiler(pch.language)?.arguments(&spec)?;
    Ok(args.tokens().to_vec())
}
