//! Precompiled header declarations.

use std::path::{Path, PathBuf};

use crate::core::compile_spec::{Language, Macro};
use crate::core::container::{Named, NamedContainer};

/// A declared intent to precompile one or more headers.
///
/// The name is fixed at creation; everything else is configured afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecompiledHeader {
    name: String,
    /// Header language
    pub language: Language,
    /// Headers to precompile
    pub headers: Vec<PathBuf>,
    /// Macro definitions
    pub macros: Vec<Macro>,
    /// Include search roots
    pub include_dirs: Vec<PathBuf>,
    /// Extra compiler arguments
    pub args: Vec<String>,
    /// Emit position-independent code
    pub pic: bool,
    /// Output directory override
    pub output_dir: Option<PathBuf>,
}

impl PrecompiledHeader {
    pub fn new(name: impl Into<String>) -> Self {
        PrecompiledHeader {
            name: name.into(),
            language: Language::default(),
            headers: Vec::new(),
            macros: Vec::new(),
            include_dirs: Vec::new(),
            args: Vec::new(),
            pic: false,
            output_dir: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a header to precompile.
    pub fn header(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.headers.push(path.into());
        self
    }

    /// Add a macro definition.
    pub fn define(&mut self, m: Macro) -> &mut Self {
        self.macros.push(m);
        self
    }

    /// Add an include root.
    pub fn include(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.include_dirs.push(dir.into());
        self
    }

    /// Output directory for this header, given the default root.
    pub fn output_dir_in(&self, target_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| target_dir.join(&self.name))
    }
}

impl Named for PrecompiledHeader {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Container of precompiled header declarations, keyed by name.
pub type PrecompiledHeaderContainer = NamedContainer<PrecompiledHeader>;

impl PrecompiledHeaderContainer {
    /// Container using the default [`PrecompiledHeader::new`] factory.
    pub fn precompiled_headers() -> Self {
        NamedContainer::new("precompiled header", |name: &str| PrecompiledHeader::new(name))
    }
}

impl Default for PrecompiledHeaderContainer {
    fn default() -> Self {
        Self::precompiled_headers()
    }
}
