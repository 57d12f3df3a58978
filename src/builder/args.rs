//! Composable argument transformers.
//!
//! A transformer turns a [`CompileSpec`] into the ordered argument list
//! for one compiler invocation. Family-specific base transformers produce
//! the canonical list; wrappers in this module post-process the output of
//! whatever they wrap:
//!
//! - [`UserArgs`] runs a caller-supplied action over the finished list.
//! - [`OptionsFile`] moves the whole list into a response file and
//!   replaces it with a single `@file` token.
//!
//! [`ArgsChain`] wires them together in the only order that makes sense:
//! base, then user args, then (optionally) the options file.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempPath;

use crate::builder::errors::PrecompileError;
use crate::core::compile_spec::CompileSpec;

/// An ordered argument list, plus any scratch files it refers to.
///
/// Scratch files are deleted when the list is dropped, so keep it alive
/// until the process that consumes it has exited.
#[derive(Debug, Default)]
pub struct Arguments {
    tokens: Vec<String>,
    scratch: Vec<TempPath>,
}

impl Arguments {
    pub fn new(tokens: Vec<String>) -> Self {
        Arguments {
            tokens,
            scratch: Vec::new(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut Vec<String> {
        &mut self.tokens
    }

    /// Response files backing this list, if any.
    pub fn scratch_files(&self) -> impl Iterator<Item = &Path> {
        self.scratch.iter().map(|p| &**p)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Length of the arguments when rendered on a command line.
    pub fn command_line_len(&self) -> usize {
        self.tokens.iter().map(|t| t.len() + 1).sum()
    }
}

/// Turns a compile spec into compiler arguments.
pub trait ArgsTransformer: Send + Sync {
    fn transform(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError>;
}

impl<T: ArgsTransformer + ?Sized> ArgsTransformer for Box<T> {
    fn transform(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
        (**self).transform(spec)
    }
}

impl<T: ArgsTransformer + ?Sized> ArgsTransformer for Arc<T> {
    fn transform(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
        (**self).transform(spec)
    }
}

/// Caller-supplied customization of the finished argument list.
pub type ArgsAction = Arc<dyn Fn(&mut Vec<String>) + Send + Sync>;

/// Runs a user action over the output of the wrapped transformer.
pub struct UserArgs<T> {
    inner: T,
    action: ArgsAction,
}

impl<T> UserArgs<T> {
    pub fn new(inner: T, action: ArgsAction) -> Self {
        UserArgs { inner, action }
    }
}

impl<T: ArgsTransformer> ArgsTransformer for UserArgs<T> {
    fn transform(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
        let mut args = self.inner.transform(spec)?;
        (self.action)(args.tokens_mut());
        Ok(args)
    }
}

impl<T> fmt::Debug for UserArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserArgs").finish_non_exhaustive()
    }
}

/// When the options file decorator collapses the argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionsFileMode {
    /// Every invocation goes through a response file.
    #[default]
    Always,
    /// Only when the rendered arguments are longer than this many bytes.
    WhenLongerThan(usize),
}

impl OptionsFileMode {
    fn engages(&self, args: &Arguments) -> bool {
        match *self {
            OptionsFileMode::Always => true,
            OptionsFileMode::WhenLongerThan(limit) => args.command_line_len() > limit,
        }
    }
}

/// Replaces the wrapped transformer's output with a single `@file` token.
///
/// The response file is written to the spec's scratch directory under a
/// unique name and deleted when the returned [`Arguments`] is dropped.
#[derive(Debug)]
pub struct OptionsFile<T> {
    inner: T,
    mode: OptionsFileMode,
}

impl<T> OptionsFile<T> {
    pub fn new(inner: T) -> Self {
        OptionsFile {
            inner,
            mode: OptionsFileMode::Always,
        }
    }

    pub fn with_mode(mut self, mode: OptionsFileMode) -> Self {
        self.mode = mode;
        self
    }
}

impl<T: ArgsTransformer> ArgsTransformer for OptionsFile<T> {
    fn transform(&self, spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
        let mut args = self.inner.transform(spec)?;
        if !self.mode.engages(&args) {
            return Ok(args);
        }

        let dir = spec.scratch_dir();
        let path = write_options_file(dir, args.tokens())?;
        tracing::debug!(
            "wrote {} argument(s) to options file {}",
            args.len(),
            path.display()
        );

        let token = format!("@{}", path_token(&path)?);
        args.tokens = vec![token];
        args.scratch.push(path);
        Ok(args)
    }
}

/// Render a path as a single argument, refusing paths that are not UTF-8.
pub(crate) fn path_token(path: &Path) -> Result<String, PrecompileError> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        PrecompileError::invalid_spec(format!("path is not valid UTF-8: {}", path.display()))
    })
}

fn write_options_file(dir: &Path, tokens: &[String]) -> Result<TempPath, PrecompileError> {
    let to_err = |source| PrecompileError::OptionsFile {
        path: dir.to_path_buf(),
        source,
    };
    // The compiler may run in another directory, so hand it an absolute path
    let dir = std::path::absolute(dir).map_err(to_err)?;

    let mut file = tempfile::Builder::new()
        .prefix("options-")
        .suffix(".txt")
        .tempfile_in(&dir)
        .map_err(to_err)?;

    file.write_all(render_options_file(tokens).as_bytes())
        .map_err(to_err)?;
    file.flush().map_err(to_err)?;

    // Close our handle so the compiler can open the file on every platform
    Ok(file.into_temp_path())
}

/// Render tokens in GCC response file syntax, one per line.
pub fn render_options_file(tokens: &[String]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&quote_token(token));
        out.push('\n');
    }
    out
}

fn quote_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if !needs_quotes {
        return token.to_string();
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Split response file contents back into tokens.
///
/// Follows the GCC grammar: whitespace separates tokens, single and double
/// quotes group, and a backslash escapes the next character.
pub fn parse_options_file(contents: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = contents.chars();

    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', _) => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => current.push(c),
            ('"' | '\'', None) => {
                quote = Some(c);
                in_token = true;
            }
            (c, None) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (c, None) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Builder that composes a base transformer with the standard wrappers.
pub struct ArgsChain {
    transformer: Box<dyn ArgsTransformer>,
}

impl ArgsChain {
    /// Start a chain from a family-specific base transformer.
    pub fn new(base: impl ArgsTransformer + 'static) -> Self {
        ArgsChain {
            transformer: Box::new(base),
        }
    }

    /// Run `action` over the arguments produced so far.
    pub fn with_user_args(self, action: ArgsAction) -> Self {
        ArgsChain {
            transformer: Box::new(UserArgs::new(self.transformer, action)),
        }
    }

    /// Collapse the arguments into a response file when `mode` is set.
    pub fn with_options_file(self, mode: Option<OptionsFileMode>) -> Self {
        match mode {
            Some(mode) => ArgsChain {
                transformer: Box::new(OptionsFile::new(self.transformer).with_mode(mode)),
            },
            None => self,
        }
    }

    pub fn build(self) -> Arc<dyn ArgsTransformer> {
        Arc::from(self.transformer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Returns a fixed token list regardless of the spec.
    struct Fixed(Vec<&'static str>);

    impl ArgsTransformer for Fixed {
        fn transform(&self, _spec: &CompileSpec) -> Result<Arguments, PrecompileError> {
            Ok(Arguments::new(self.0.iter().map(|s| s.to_string()).collect()))
        }
    }

    fn spec_in(dir: &Path) -> CompileSpec {
        CompileSpec::new("/src/pch.h", dir)
    }

    #[test]
    fn test_user_args_run_after_inner() {
        let t = UserArgs::new(
            Fixed(vec!["-x", "c++-header", "-c"]),
            Arc::new(|args: &mut Vec<String>| args.push("--extra".to_string())),
        );

        let args = t.transform(&CompileSpec::default()).unwrap();
        assert_eq!(args.tokens(), ["-x", "c++-header", "-c", "--extra"]);
    }

    #[test]
    fn test_user_args_can_mutate() {
        let t = UserArgs::new(
            Fixed(vec!["-O0", "-c"]),
            Arc::new(|args: &mut Vec<String>| args.retain(|a| a != "-O0")),
        );

        let args = t.transform(&CompileSpec::default()).unwrap();
        assert_eq!(args.tokens(), ["-c"]);
    }

    #[test]
    fn test_options_file_round_trip() {
        let tmp = TempDir::new().unwrap();
        let tokens = vec![
            "-x",
            "c++-header",
            "-DNAME=a b",
            "-I",
            "C:\\inc",
            "",
            "it's",
            "/src/pch.h",
        ];
        let t = OptionsFile::new(Fixed(tokens.clone()));

        let args = t.transform(&spec_in(tmp.path())).unwrap();
        assert_eq!(args.len(), 1);

        let token = &args.tokens()[0];
        let path = token.strip_prefix('@').unwrap();
        let contents = std::fs::read_to_string(path).unwrap();

        assert_eq!(contents.lines().count(), tokens.len());
        assert_eq!(parse_options_file(&contents), tokens);
    }

    #[test]
    fn test_options_file_deleted_on_drop() {
        let tmp = TempDir::new().unwrap();
        let t = OptionsFile::new(Fixed(vec!["-c"]));

        let args = t.transform(&spec_in(tmp.path())).unwrap();
        let path = args.scratch_files().next().unwrap().to_path_buf();
        assert!(path.exists());
        assert!(path.starts_with(tmp.path()));

        drop(args);
        assert!(!path.exists());
    }

    #[test]
    fn test_options_file_names_are_unique() {
        let tmp = TempDir::new().unwrap();
        let t = OptionsFile::new(Fixed(vec!["-c"]));
        let spec = spec_in(tmp.path());

        let a = t.transform(&spec).unwrap();
        let b = t.transform(&spec).unwrap();
        assert_ne!(a.tokens(), b.tokens());
    }

    #[test]
    fn test_options_file_threshold() {
        let tmp = TempDir::new().unwrap();
        let spec = spec_in(tmp.path());

        let short = OptionsFile::new(Fixed(vec!["-c", "a.h"]))
            .with_mode(OptionsFileMode::WhenLongerThan(100));
        let args = short.transform(&spec).unwrap();
        assert_eq!(args.tokens(), ["-c", "a.h"]);
        assert_eq!(args.scratch_files().count(), 0);

        let long = OptionsFile::new(Fixed(vec!["-c", "a.h"]))
            .with_mode(OptionsFileMode::WhenLongerThan(3));
        let args = long.transform(&spec).unwrap();
        assert_eq!(args.len(), 1);
        assert!(args.tokens()[0].starts_with('@'));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_token_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        assert_eq!(
            path_token(Path::new("/tmp/options-1.txt")).unwrap(),
            "/tmp/options-1.txt"
        );

        let path = Path::new(OsStr::from_bytes(b"/tmp/opt\xffions.txt"));
        assert!(matches!(
            path_token(path),
            Err(PrecompileError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_options_file_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let t = OptionsFile::new(Fixed(vec!["-c"]));

        let err = t
            .transform(&spec_in(&tmp.path().join("does-not-exist")))
            .unwrap_err();
        assert!(matches!(err, PrecompileError::OptionsFile { .. }));
    }

    #[test]
    fn test_parse_options_file_grammar() {
        assert_eq!(
            parse_options_file("-c  'single quoted' \"a\\\"b\"\n\tx\\ y"),
            vec!["-c", "single quoted", "a\"b", "x y"]
        );
        assert!(parse_options_file(" \n ").is_empty());
    }

    #[test]
    fn test_chain_order() {
        let tmp = TempDir::new().unwrap();
        let chain = ArgsChain::new(Fixed(vec!["-c", "pch.h"]))
            .with_user_args(Arc::new(|args: &mut Vec<String>| {
                args.push("--extra".to_string())
            }))
            .with_options_file(Some(OptionsFileMode::Always))
            .build();

        let args = chain.transform(&spec_in(tmp.path())).unwrap();
        let path = args.tokens()[0].strip_prefix('@').unwrap().to_string();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(parse_options_file(&contents), vec!["-c", "pch.h", "--extra"]);
    }

    #[test]
    fn test_chain_without_options_file() {
        let chain = ArgsChain::new(Fixed(vec!["-c"]))
            .with_options_file(None)
            .build();

        let args = chain.transform(&CompileSpec::default()).unwrap();
        assert_eq!(args.tokens(), ["-c"]);
    }
}
