use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use drm_license_keys::ExchangeOutcome;

use crate::input::{KeyArgs, read_message};

const REQUEST_EXT: &str = "request";
const RESPONSE_EXT: &str = "response";

/**
    Extract content keys from every captured session in a directory.

    Captures are paired by file stem: `<session>.request` with
    `<session>.response`. Keys are printed as `session<TAB>id:key`.
*/
#[derive(Args)]
pub struct BatchCommand {
    #[command(flatten)]
    keys: KeyArgs,

    /**
        Directory holding the captured sessions.
    */
    dir: PathBuf,

    /**
        Captures are base64 text rather than raw bytes.
    */
    #[arg(long)]
    base64: bool,

    /**
        Maximum number of exchanges evaluated at once.
    */
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /**
        Skip content key entries that fail to unwrap instead of failing.
    */
    #[arg(long)]
    skip_bad_entries: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Capture {
    request: Option<PathBuf>,
    response: Option<PathBuf>,
}

impl BatchCommand {
    pub async fn run(self) -> Result<()> {
        let exchange = Arc::new(self.keys.exchange(self.skip_bad_entries)?);
        let init = Arc::clone(&exchange);
        tokio::task::spawn_blocking(move || init.ensure_initialized().map(|_| ()))
            .await
            .context("key initialization task panicked")?
            .context("device key pair is unusable")?;

        let sessions = pair_captures(list_dir(&self.dir).await?);
        eprintln!("Found {} sessions in {}", sessions.len(), self.dir.display());

        let permits = Arc::new(Semaphore::new(self.jobs.max(1)));
        let mut tasks = JoinSet::new();
        for (session, capture) in sessions {
            let (Some(request), Some(response)) = (capture.request, capture.response) else {
                warn!(session = %session, "capture has no matching request/response, skipping");
                continue;
            };
            let permit = Arc::clone(&permits).acquire_owned().await?;
            let exchange = Arc::clone(&exchange);
            let base64 = self.base64;
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let outcome = evaluate(&exchange, &request, &response, base64);
                (session, outcome)
            });
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (session, outcome) = joined.context("exchange task panicked")?;
            results.insert(session, outcome);
        }

        let total = results.len();
        let mut failed = 0;
        for (session, outcome) in results {
            match outcome {
                Ok(ExchangeOutcome::Extracted { keys, skipped }) => {
                    for e in &skipped {
                        eprintln!("{session}: skipped {e}");
                    }
                    if keys.is_empty() {
                        eprintln!("{session}: no content keys");
                    }
                    for key in &keys {
                        println!("{session}\t{key}");
                    }
                }
                Ok(ExchangeOutcome::NotApplicable { .. }) => {
                    eprintln!("{session}: not a license request");
                }
                Ok(ExchangeOutcome::Failed(e)) => {
                    failed += 1;
                    eprintln!("{session}: failed at {}: {e}", e.stage());
                }
                Err(e) => {
                    failed += 1;
                    eprintln!("{session}: {e:#}");
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {total} exchanges failed");
        }
        Ok(())
    }
}

fn evaluate(
    exchange: &drm_license_keys::LicenseExchange,
    request: &Path,
    response: &Path,
    base64: bool,
) -> Result<ExchangeOutcome> {
    let request = read_message(request, base64)?;
    let response = read_message(response, base64)?;
    Ok(exchange.extract(&request, &response)?)
}

async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read {}", dir.display()))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("failed to list capture directory")?
    {
        paths.push(entry.path());
    }
    Ok(paths)
}

/**
    Group capture files by session id (the file stem). Files with any other
    extension are ignored.
*/
fn pair_captures(paths: impl IntoIterator<Item = PathBuf>) -> BTreeMap<String, Capture> {
    let mut sessions: BTreeMap<String, Capture> = BTreeMap::new();
    for path in paths {
        let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
            continue;
        };
        let session = stem.to_string_lossy().into_owned();
        if ext == REQUEST_EXT {
            sessions.entry(session).or_default().request = Some(path);
        } else if ext == RESPONSE_EXT {
            sessions.entry(session).or_default().response = Some(path);
        }
    }
    sessions
}
