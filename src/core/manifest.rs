//! Precomp.toml manifest parsing.
//!
//! The manifest declares precompiled headers as `[[header]]` tables. Each
//! declaration becomes an entry of a [`PrecompiledHeaderContainer`], so
//! duplicate names are rejected exactly like any other container create.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::core::compile_spec::{Language, Macro};
use crate::core::pch::PrecompiledHeaderContainer;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Precomp.toml";

/// Error locating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Precomp.toml` in `{}` or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default, rename = "header")]
    headers: Vec<HeaderDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct HeaderDecl {
    name: String,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    headers: Vec<PathBuf>,
    #[serde(default)]
    include_dirs: Vec<PathBuf>,
    #[serde(default)]
    defines: Vec<Macro>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    pic: bool,
    output_dir: Option<PathBuf>,
}

/// A parsed manifest.
#[derive(Debug)]
pub struct Manifest {
    root: PathBuf,
    headers: PrecompiledHeaderContainer,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        let root = path.parent().unwrap_or(Path::new("."));
        Self::parse(&contents, root)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse manifest contents; relative paths resolve against `root`.
    pub fn parse(contents: &str, root: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(contents)?;

        let mut headers = PrecompiledHeaderContainer::default();
        for decl in raw.headers {
            let pch = headers.create(&decl.name)?;
            pch.language = decl.language;
            pch.headers = decl.headers.iter().map(|p| root.join(p)).collect();
            pch.include_dirs = decl.include_dirs.iter().map(|p| root.join(p)).collect();
            pch.macros = decl.defines;
            pch.args = decl.args;
            pch.pic = decl.pic;
            pch.output_dir = decl.output_dir.map(|p| root.join(p));
        }

        Ok(Manifest {
            root: root.to_path_buf(),
            headers,
        })
    }

    /// Directory containing the manifest.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Declared headers, in manifest order.
    pub fn headers(&self) -> &PrecompiledHeaderContainer {
        &self.headers
    }
}

/// Find the manifest in `start` or the nearest parent directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}
