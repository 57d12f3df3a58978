//! `precomp list` command

use std::path::PathBuf;

use anyhow::Result;

use super::Project;

pub fn execute(manifest: Option<PathBuf>) -> Result<()> {
    let project = Project::load(manifest)?;

    for pch in project.manifest.headers() {
        let out_dir = pch.output_dir_in(&project.options.target_dir);
        println!(
            "{} ({}, {} header(s)) -> {}",
            pch.name(),
            pch.language.as_str(),
            pch.headers.len(),
            out_dir.display()
        );
    }
    Ok(())
}
