//! Draftsmith CLI application
//!
//! Command-line interface for staging, publishing, and undoing
//! structured edits against a content-managed website.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use draftsmith_core::{Config, HttpStore};
use log::info;
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args { no_color, command } = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = HttpStore::new(&config).context("Failed to initialize content store")?;
    let cli = Cli::new(config, store, TerminalRenderer::new(!no_color));

    info!("Draftsmith started");

    match command {
        Commands::Discover => cli.discover().await,
        Commands::Plan(args) => cli.plan(args).await,
        Commands::Execute(args) => cli.execute(args).await,
        Commands::Sessions => cli.sessions().await,
        Commands::Publish(args) => cli.publish(args).await,
        Commands::Undo(args) => cli.undo(args).await,
    }
}
