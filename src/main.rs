mod build;
mod check;
mod cli;
mod config;
mod glossary;
mod report;
mod terms;
mod tra;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build::run(args)?,
        Commands::Check(args) => check::run(args)?,
        Commands::Config(args) => config::commands::run(args)?,
    }

    Ok(())
}
