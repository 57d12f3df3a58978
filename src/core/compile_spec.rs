//! The resolved description of one precompile request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source language of a precompiled header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C header
    C,
    /// C++ header (default)
    #[default]
    #[serde(alias = "cpp", alias = "c++")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// Value passed to `-x` when precompiling a header of this language.
    pub fn header_flag_value(&self) -> &'static str {
        match self {
            Language::C => "c-header",
            Language::Cxx => "c++-header",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cpp" | "cxx" => Ok(Language::Cxx),
            other => Err(format!("unknown language `{}` (expected `c` or `c++`)", other)),
        }
    }
}

/// A preprocessor macro: `-DNAME` or `-DNAME=VALUE`.
///
/// In manifests a macro is either a `"NAME"` / `"NAME=VALUE"` string or a
/// `{ name, value }` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "MacroDecl")]
pub struct Macro {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MacroDecl {
    Text(String),
    Table { name: String, value: Option<String> },
}

impl From<MacroDecl> for Macro {
    fn from(decl: MacroDecl) -> Self {
        match decl {
            MacroDecl::Text(s) => Macro::parse(&s),
            MacroDecl::Table { name, value } => Macro { name, value },
        }
    }
}

impl Macro {
    pub fn flag(name: impl Into<String>) -> Self {
        Macro {
            name: name.into(),
            value: None,
        }
    }

    pub fn key_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Macro {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Parse `NAME` or `NAME=VALUE`; the value keeps any further `=`.
    pub fn parse(s: &str) -> Self {
        match s.split_once('=') {
            Some((name, value)) => Macro::key_value(name, value),
            None => Macro::flag(s),
        }
    }

    pub fn to_flag(&self) -> String {
        match self.value {
            Some(ref value) => format!("-D{}={}", self.name, value),
            None => format!("-D{}", self.name),
        }
    }
}

/// Everything needed to precompile a set of headers.
///
/// The precompile pipeline only ever borrows a spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSpec {
    /// Header language
    pub language: Language,
    /// Macro definitions, in declaration order
    pub macros: Vec<Macro>,
    /// Include search roots
    pub include_roots: Vec<PathBuf>,
    /// Headers to precompile
    pub headers: Vec<PathBuf>,
    /// Directory the compiler writes into (also its working directory)
    pub object_file_dir: PathBuf,
    /// Where response files go; falls back to `object_file_dir`
    pub temp_dir: Option<PathBuf>,
    /// Emit position-independent code
    pub position_independent_code: bool,
    /// Extra arguments passed through verbatim
    pub args: Vec<String>,
}

impl CompileSpec {
    /// Create a spec for a single header.
    pub fn new(header: impl Into<PathBuf>, object_file_dir: impl Into<PathBuf>) -> Self {
        CompileSpec {
            headers: vec![header.into()],
            object_file_dir: object_file_dir.into(),
            ..Default::default()
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn define(mut self, m: Macro) -> Self {
        self.macros.push(m);
        self
    }

    pub fn include(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_roots.push(dir.into());
        self
    }

    pub fn header(mut self, header: impl Into<PathBuf>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn pic(mut self, pic: bool) -> Self {
        self.position_independent_code = pic;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Directory for scratch files such as response files.
    pub fn scratch_dir(&self) -> &Path {
        self.temp_dir.as_deref().unwrap_or(&self.object_file_dir)
    }
}
