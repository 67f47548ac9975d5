use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use drm_license_keys::{ExchangeOptions, KeyMaterial, LicenseExchange, UnwrapPolicy};

/**
    Location of the device key pair.
*/
#[derive(Args)]
pub struct KeyArgs {
    /**
        PEM file with the device public key (SubjectPublicKeyInfo or PKCS#1).
    */
    #[arg(long, env = "DRM_PUBLIC_KEY")]
    public_key: PathBuf,

    /**
        PEM file with the device private key (PKCS#8 or PKCS#1).
    */
    #[arg(long, env = "DRM_PRIVATE_KEY")]
    private_key: PathBuf,
}

impl KeyArgs {
    pub fn material(&self) -> Result<KeyMaterial> {
        KeyMaterial::from_files(&self.public_key, &self.private_key)
            .context("failed to load device key pair")
    }

    pub fn exchange(&self, skip_bad_entries: bool) -> Result<LicenseExchange> {
        let policy = if skip_bad_entries {
            UnwrapPolicy::Skip
        } else {
            UnwrapPolicy::Abort
        };
        Ok(LicenseExchange::new(self.material()?)
            .with_options(ExchangeOptions::new().with_unwrap_policy(policy)))
    }
}

/**
    Read a captured message, either raw bytes or base64 text.
*/
pub fn read_message(path: &Path, base64: bool) -> Result<Vec<u8>> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !base64 {
        return Ok(data);
    }
    let text: Vec<u8> = data
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    data_encoding::BASE64
        .decode(&text)
        .with_context(|| format!("{} is not valid base64", path.display()))
}
