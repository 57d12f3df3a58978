//! Precomp CLI - precompiled header driver

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("precomp=debug")
    } else {
        EnvFilter::new("precomp=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let manifest = cli.manifest;

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(manifest, args),
        Commands::Args(args) => commands::args::execute(manifest, args),
        Commands::List => commands::list::execute(manifest),
        Commands::Toolchain(args) => commands::toolchain::execute(manifest, args),
    }
}
