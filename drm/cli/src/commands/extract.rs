use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use drm_license_keys::{ContentKey, ExchangeOutcome};

use crate::input::{KeyArgs, read_message};

/**
    Extract content keys from one captured request/response pair.
*/
#[derive(Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    keys: KeyArgs,

    /**
        Captured signed license request.
    */
    #[arg(long)]
    request: PathBuf,

    /**
        Captured signed license response answering the request.
    */
    #[arg(long)]
    response: PathBuf,

    /**
        Both captures are base64 text rather than raw bytes.
    */
    #[arg(long)]
    base64: bool,

    /**
        Print only the first content key.
    */
    #[arg(long)]
    first: bool,

    /**
        Skip content key entries that fail to unwrap instead of failing.
    */
    #[arg(long)]
    skip_bad_entries: bool,

    /**
        Fail unless this `<id>:<key>` pair (hex) is among the extracted
        keys. May be repeated.
    */
    #[arg(long, value_name = "ID:KEY")]
    expect: Vec<ContentKey>,
}

impl ExtractCommand {
    pub fn run(self) -> Result<()> {
        let exchange = self.keys.exchange(self.skip_bad_entries)?;
        let request = read_message(&self.request, self.base64)?;
        let response = read_message(&self.response, self.base64)?;
        eprintln!(
            "Loaded request ({} bytes) and response ({} bytes)",
            request.len(),
            response.len()
        );

        let outcome = exchange
            .extract(&request, &response)
            .context("device key pair is unusable")?;

        match outcome {
            ExchangeOutcome::Extracted { keys, skipped } => {
                for e in &skipped {
                    eprintln!("Skipped {e}");
                }
                eprintln!("Extracted {} content keys:", keys.len());
                eprintln!();
                let shown = if self.first { keys.len().min(1) } else { keys.len() };
                for key in &keys[..shown] {
                    println!("{key}");
                }
                check_expected(&keys, &self.expect)
            }
            ExchangeOutcome::NotApplicable { message_type } => {
                match message_type {
                    Some(t) => eprintln!("Request is message type {t}, not a license request"),
                    None => eprintln!("Request has no message type, not a license request"),
                }
                Ok(())
            }
            ExchangeOutcome::Failed(e) => bail!("license exchange failed at {}: {e}", e.stage()),
        }
    }
}

/**
    Every expected key must have been extracted under its id with the same
    key bytes.
*/
fn check_expected(keys: &[ContentKey], expected: &[ContentKey]) -> Result<()> {
    for want in expected {
        match keys.iter().find(|k| k.id() == want.id()) {
            Some(got) if got.key() == want.key() => {}
            Some(got) => bail!(
                "content key {} is {}, expected {}",
                want.id_hex(),
                got.key_hex(),
                want.key_hex()
            ),
            None => bail!("content key {} was not extracted", want.id_hex()),
        }
    }
    Ok(())
}
