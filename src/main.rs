use anyhow::Context;
use clap::Parser;
use openmeteo_history::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("historical weather download failed")?;
    Ok(())
}
