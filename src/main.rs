use crate::pipeline::workflow::launch;
use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod llm;
mod pipeline;
mod progress;
mod session;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = args.into_config();

    launch(&config).await
}
