//! Command implementations

pub mod args;
pub mod build;
pub mod list;
pub mod toolchain;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::CompilerArgs;
use precomp::core::manifest::{find_manifest, Manifest};
use precomp::ops::PrecompileOptions;
use precomp::util::config::{global_config_path, load_config, project_config_path};

/// Manifest plus the options derived from config files.
pub struct Project {
    pub manifest: Manifest,
    pub options: PrecompileOptions,
}

impl Project {
    /// Locate and load the manifest and its config.
    pub fn load(manifest_path: Option<PathBuf>) -> Result<Self> {
        let manifest_path = match manifest_path {
            Some(path) => path,
            None => {
                let cwd = std::env::current_dir().context("failed to get current directory")?;
                find_manifest(&cwd)?
            }
        };

        let manifest = Manifest::load(&manifest_path)?;
        let config = load_config(
            global_config_path().as_deref(),
            &project_config_path(manifest.root()),
        );
        let options = PrecompileOptions::from_config(&config, manifest.root());

        Ok(Project { manifest, options })
    }

    /// Apply command-line compiler overrides.
    pub fn with_compiler_args(mut self, args: CompilerArgs) -> Self {
        apply_compiler_args(&mut self.options, args);
        self
    }
}

/// Precompile options for commands that do not need a manifest.
///
/// Outside a project, options come from the global config and a project
/// config in the current directory, if any.
pub fn standalone_options(
    manifest_path: Option<PathBuf>,
    args: CompilerArgs,
) -> Result<PrecompileOptions> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let found = match manifest_path {
        Some(path) => Some(path),
        None => find_manifest(&cwd).ok(),
    };

    let mut options = match found {
        Some(path) => Project::load(Some(path))?.options,
        None => {
            tracing::debug!("no manifest found, using configuration defaults");
            let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
            PrecompileOptions::from_config(&config, &cwd)
        }
    };
    apply_compiler_args(&mut options, args);
    Ok(options)
}

fn apply_compiler_args(options: &mut PrecompileOptions, args: CompilerArgs) {
    if args.compiler.is_some() {
        options.compiler = args.compiler;
    }
    options.user_args.extend(args.args);
}
