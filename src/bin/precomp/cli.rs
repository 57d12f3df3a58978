//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use precomp::core::Language;

/// Precomp - precompiled header driver for GCC-family compilers
#[derive(Parser)]
#[command(name = "precomp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to Precomp.toml (defaults to searching upward from cwd)
    #[arg(long, global = true, env = "PRECOMP_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Precompile declared headers
    Build(BuildArgs),

    /// Show the compiler arguments for a declared header
    Args(ArgsArgs),

    /// List declared headers
    List,

    /// Show the compiler that would be used
    Toolchain(ToolchainArgs),
}

/// Compiler options shared by commands that compose arguments.
#[derive(Args)]
pub struct CompilerArgs {
    /// Compiler to run (overrides config, CXX and CC)
    #[arg(long, env = "PRECOMP_COMPILER")]
    pub compiler: Option<PathBuf>,

    /// Extra argument appended after the generated ones (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Headers to precompile (defaults to all)
    pub names: Vec<String>,

    /// Pass arguments through a response file
    #[arg(long)]
    pub options_file: bool,

    /// Output root for headers without an explicit output dir
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}

#[derive(Args)]
pub struct ArgsArgs {
    /// Header to show arguments for
    pub name: String,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Header language (`c` or `c++`)
    #[arg(long, default_value = "c++")]
    pub language: Language,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}
