//! `precomp build` command

use std::time::Instant;

use anyhow::Result;

use super::Project;
use crate::cli::BuildArgs;
use precomp::builder::args::OptionsFileMode;
use precomp::ops::precompile;

pub fn execute(manifest: Option<std::path::PathBuf>, args: BuildArgs) -> Result<()> {
    let start = Instant::now();
    let mut project = Project::load(manifest)?.with_compiler_args(args.compiler);

    if args.options_file && project.options.options_file.is_none() {
        project.options.options_file = Some(OptionsFileMode::Always);
    }
    if let Some(dir) = args.target_dir {
        project.options.target_dir = dir;
    }

    let built = precompile(&project.manifest, &args.names, &project.options)?;

    eprintln!(
        "    Finished {} precompiled header(s) in {:.2}s",
        built.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
