//! TutorHub CLI: inspect blog content and contact lists from the CMS.
//!
//! Renders the articles stored in the CMS blog page and resolves who a
//! user may message, either live against the API or from saved JSON.

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
