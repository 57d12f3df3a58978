//! `precomp args` command

use std::path::PathBuf;

use anyhow::Result;

use super::Project;
use crate::cli::ArgsArgs;

pub fn execute(manifest: Option<PathBuf>, args: ArgsArgs) -> Result<()> {
    let project = Project::load(manifest)?.with_compiler_args(args.compiler);

    let tokens = precomp::ops::arguments(&project.manifest, &args.name, &project.options)?;
    for token in tokens {
        println!("{}", token);
    }
    Ok(())
}
