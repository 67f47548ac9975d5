use anyhow::{Context, Result, bail};
use clap::Args;

use drm_license_keys::KeyPair;

use crate::input::KeyArgs;

/**
    Import the device key pair and run its self-test.
*/
#[derive(Args)]
pub struct SelfTestCommand {
    #[command(flatten)]
    keys: KeyArgs,
}

impl SelfTestCommand {
    pub fn run(self) -> Result<()> {
        let material = self.keys.material()?;
        let pair = KeyPair::from_pem(material.public_pem(), material.private_pem())
            .context("failed to import device key pair")?;

        println!("Modulus:    {} bits", pair.modulus_bits());
        if !pair.self_test() {
            println!("Self-test:  FAILED");
            bail!("public and private keys do not form a pair");
        }
        println!("Self-test:  OK");
        Ok(())
    }
}
