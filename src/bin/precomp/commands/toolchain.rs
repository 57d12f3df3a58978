//! `precomp toolchain` command

use std::path::PathBuf;

use anyhow::Result;

use super::standalone_options;
use crate::cli::ToolchainArgs;
use precomp::util::process::ProcessBuilder;

pub fn execute(manifest: Option<PathBuf>, args: ToolchainArgs) -> Result<()> {
    let options = standalone_options(manifest, args.compiler)?;
    let language = args.language;

    let compiler = options.compiler_for(language)?;
    println!("{}: {}", language.as_str(), compiler.display());

    // Best effort, the compiler may not understand --version
    match ProcessBuilder::new(&compiler).arg("--version").exec() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(line) = stdout.lines().next() {
                println!("version: {}", line);
            }
        }
        Ok(_) => tracing::debug!("`{} --version` failed", compiler.display()),
        Err(e) => tracing::warn!("{}", e),
    }
    Ok(())
}
