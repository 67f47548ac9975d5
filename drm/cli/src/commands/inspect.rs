use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use drm_license_keys::KeyType;
use drm_license_keys::proto::signed_message::MessageType;
use drm_license_keys::proto::{License, LicenseRequest, Message, SignedMessage, license};

use crate::input::read_message;

/**
    Print the structure of a captured signed message.
*/
#[derive(Args)]
pub struct InspectCommand {
    /// Captured message file.
    pub file: PathBuf,

    /// The capture is base64 text rather than raw bytes.
    #[arg(long)]
    pub base64: bool,

    /// Only list license entries of this key type (e.g. `content`).
    #[arg(long = "type", value_name = "KEY_TYPE")]
    pub key_type: Option<KeyType>,
}

impl InspectCommand {
    pub fn run(self) -> Result<()> {
        let data = read_message(&self.file, self.base64)?;
        let message =
            SignedMessage::decode(data.as_slice()).context("failed to decode signed message")?;

        match message.message_type() {
            Some(t) => println!("Type:        {t:?}"),
            None => println!("Type:        {:?}", message.r#type),
        }
        println!("Payload:     {} bytes", len(&message.msg));
        println!("Signature:   {} bytes", len(&message.signature));
        match &message.session_key {
            Some(key) => println!("Session Key: {} bytes (wrapped)", key.len()),
            None => println!("Session Key: none"),
        }

        let payload = message.msg.as_deref().unwrap_or_default();
        match message.message_type() {
            Some(MessageType::LicenseRequest) => {
                let request =
                    LicenseRequest::decode(payload).context("failed to decode license request")?;
                print_request(&request);
            }
            Some(MessageType::License) => {
                let license = License::decode(payload).context("failed to decode license")?;
                print_license(&license, self.key_type);
            }
            _ => {}
        }

        Ok(())
    }
}

fn print_request(request: &LicenseRequest) {
    println!();
    println!("Request Type:     {}", opt(request.r#type));
    println!("Request Time:     {}", opt(request.request_time));
    println!("Protocol Version: {}", opt(request.protocol_version));
}

fn print_license(license: &License, filter: Option<KeyType>) {
    if let Some(start) = license.license_start_time {
        println!();
        println!("Start Time:  {start}");
    }

    println!();
    println!("Key Entries ({}):", license.key.len());
    for (index, entry) in selected_entries(license, filter) {
        print_entry(index, entry);
    }
}

/**
    Entries with their license index, restricted to `filter` when given.
*/
fn selected_entries(
    license: &License,
    filter: Option<KeyType>,
) -> impl Iterator<Item = (usize, &license::KeyContainer)> {
    license
        .key
        .iter()
        .enumerate()
        .filter(move |(_, entry)| filter.is_none_or(|kt| entry.is_type(kt)))
}

fn print_entry(index: usize, entry: &license::KeyContainer) {
    let key_type = match entry.key_type() {
        Some(t) => t.to_string(),
        None => opt(entry.r#type),
    };
    println!(
        "  [{index}] {key_type:<16} id={} level={} key={}B iv={}B",
        entry.id.as_deref().map(hex::encode).unwrap_or_default(),
        opt(entry.level),
        len(&entry.key),
        len(&entry.iv),
    );
}

fn len(field: &Option<Vec<u8>>) -> usize {
    field.as_ref().map_or(0, Vec::len)
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
