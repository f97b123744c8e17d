//! ToolScout CLI: scrape AI tool websites and keep the catalogue enriched.
//!
//! Analyzes tool URLs with deterministic and AI-backed analyzers and stores
//! the results in a local libSQL catalogue.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
