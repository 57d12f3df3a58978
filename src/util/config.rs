//! Configuration file support for Precomp.
//!
//! Precomp supports two configuration file locations:
//! - Global: `~/.precomp/config.toml` - User-wide defaults
//! - Project: `.precomp/config.toml` - Next to the manifest
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::args::OptionsFileMode;

/// Precomp configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compiler settings
    pub toolchain: ToolchainSettings,

    /// Precompile settings
    pub precompile: PrecompileConfig,
}

/// Compiler overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C++ compiler (e.g., /usr/bin/g++)
    pub cxx: Option<PathBuf>,

    /// Path to the C compiler (e.g., /usr/bin/gcc)
    pub cc: Option<PathBuf>,
}

/// Precompile settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PrecompileConfig {
    /// Pass arguments through a response file
    pub options_file: Option<bool>,

    /// Only use the response file above this command length
    pub options_file_threshold: Option<usize>,

    /// Arguments appended after the generated ones
    pub args: Vec<String>,

    /// Default output root (`<target-dir>/<name>`)
    pub target_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Toolchain settings
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }

        // Precompile settings
        if other.precompile.options_file.is_some() {
            self.precompile.options_file = other.precompile.options_file;
        }
        if other.precompile.options_file_threshold.is_some() {
            self.precompile.options_file_threshold = other.precompile.options_file_threshold;
        }
        if !other.precompile.args.is_empty() {
            self.precompile.args = other.precompile.args;
        }
        if other.precompile.target_dir.is_some() {
            self.precompile.target_dir = other.precompile.target_dir;
        }
    }

    /// Options file mode, if response files are enabled.
    pub fn options_file_mode(&self) -> Option<OptionsFileMode> {
        if !self.precompile.options_file.unwrap_or(false) {
            return None;
        }
        Some(match self.precompile.options_file_threshold {
            Some(limit) => OptionsFileMode::WhenLongerThan(limit),
            None => OptionsFileMode::Always,
        })
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.precomp/config.toml)
/// 2. Global config (~/.precomp/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global precomp config directory (~/.precomp).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".precomp"))
}

/// Get the global config path (~/.precomp/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.precomp/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".precomp").join("config.toml")
}
