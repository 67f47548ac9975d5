use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{BatchCommand, ExtractCommand, InspectCommand, SelfTestCommand};

/**
    Content key extraction from captured license exchanges.
*/
#[derive(Parser)]
#[command(name = "drm-keys", version)]
pub struct Cli {
    /**
        Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    */
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract content keys from one request/response pair.
    Extract(ExtractCommand),
    /// Extract content keys from a directory of captured sessions.
    Batch(BatchCommand),
    /// Import the device key pair and run its self-test.
    SelfTest(SelfTestCommand),
    /// Print the structure of a captured message.
    Inspect(InspectCommand),
}

impl Cli {
    /**
        Install the stderr log subscriber. Key output goes to stdout.
    */
    pub fn init_tracing(&self) {
        let default = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Extract(cmd) => cmd.run(),
            Command::Batch(cmd) => cmd.run().await,
            Command::SelfTest(cmd) => cmd.run(),
            Command::Inspect(cmd) => cmd.run(),
        }
    }
}
