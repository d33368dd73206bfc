//! mdjson CLI — convert a tree of Markdown documents into JSON.
//!
//! Each document becomes a record of front matter, title and rendered HTML,
//! written one file per document or consolidated into a single nested file.

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
