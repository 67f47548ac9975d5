mod cli;
mod commands;
mod input;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    cli.init_tracing();
    cli.run().await
}
