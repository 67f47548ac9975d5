/*!
    Test key material and a builder for captured-looking license exchanges.
*/

use std::sync::OnceLock;

use aes::Aes128;
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use drm_license_proto::license::KeyContainer;
use drm_license_proto::license::key_container::KeyType as ProtoKeyType;
use drm_license_proto::license_request::RequestType;
use drm_license_proto::prost::Message;
use drm_license_proto::signed_message::{MessageType, SessionKeyType};
use drm_license_proto::{License, LicenseRequest, ProtocolVersion, SignedMessage};

use crate::derive::derive;
use crate::provisioning::{KeyMaterial, KeyPair};

pub const DEVICE_PUBLIC_PEM: &str = include_str!("../testfiles/device.pub.pem");
pub const DEVICE_PRIVATE_PEM: &str = include_str!("../testfiles/device.key.pem");
pub const DEVICE_PKCS1_PRIVATE_PEM: &str = include_str!("../testfiles/device.rsa.pem");
pub const DEVICE_PKCS1_PUBLIC_PEM: &str = include_str!("../testfiles/device.rsapub.pem");
pub const OTHER_PUBLIC_PEM: &str = include_str!("../testfiles/other.pub.pem");
pub const OTHER_PRIVATE_PEM: &str = include_str!("../testfiles/other.key.pem");

const SESSION_KEY: [u8; 16] = *b"fixture-session!";

pub fn device_material() -> KeyMaterial {
    KeyMaterial::new(DEVICE_PUBLIC_PEM, DEVICE_PRIVATE_PEM)
}

pub fn device_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::initialize(&device_material()).unwrap())
}

pub fn other_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| {
        KeyPair::initialize(&KeyMaterial::new(OTHER_PUBLIC_PEM, OTHER_PRIVATE_PEM)).unwrap()
    })
}

/**
    AES-128-CBC with PKCS#7 padding, the way a license server wraps a
    content key: 16 bytes in, 32 bytes out.
*/
pub fn wrap_content_key(enc_key: &[u8; 16], iv: &[u8; 16], key: &[u8; 16]) -> Vec<u8> {
    let mut buf = [0u8; 32];
    buf[..16].copy_from_slice(key);
    cbc::Encryptor::<Aes128>::new(enc_key.into(), iv.into())
        .encrypt_padded_mut::<Pkcs7>(&mut buf, 16)
        .unwrap()
        .to_vec()
}

pub fn content_entry(id: &[u8], key: &[u8; 16], enc_key: &[u8; 16], iv: &[u8; 16]) -> KeyContainer {
    KeyContainer {
        id: Some(id.to_vec()),
        iv: Some(iv.to_vec()),
        key: Some(wrap_content_key(enc_key, iv, key)),
        r#type: Some(ProtoKeyType::Content as i32),
        ..Default::default()
    }
}

/**
    Builds a signed license request and the license response answering it.

    The request is signed by `signer` (the recipient unless overridden),
    the session key is wrapped for the recipient, and every content key is
    wrapped under the key derived from the request payload.
*/
pub struct ExchangeFixture {
    recipient: &'static KeyPair,
    signer: &'static KeyPair,
    entries: Vec<(ProtoKeyType, Vec<u8>, [u8; 16])>,
}

impl ExchangeFixture {
    pub fn new(recipient: &'static KeyPair) -> Self {
        Self {
            recipient,
            signer: recipient,
            entries: Vec::new(),
        }
    }

    pub fn signed_by(mut self, signer: &'static KeyPair) -> Self {
        self.signer = signer;
        self
    }

    pub fn content_key(mut self, id: &[u8], key: &[u8; 16]) -> Self {
        self.entries.push((ProtoKeyType::Content, id.to_vec(), *key));
        self
    }

    pub fn signing_key(mut self) -> Self {
        self.entries.push((ProtoKeyType::Signing, Vec::new(), [0x5e; 16]));
        self
    }

    pub fn key_control(mut self) -> Self {
        self.entries.push((ProtoKeyType::KeyControl, Vec::new(), [0x00; 16]));
        self
    }

    /**
        The serialized LicenseRequest payload (the signed bytes).
    */
    pub fn request_msg(&self) -> Vec<u8> {
        LicenseRequest {
            r#type: Some(RequestType::New as i32),
            request_time: Some(1_700_000_000),
            protocol_version: Some(ProtocolVersion::Version21 as i32),
            key_control_nonce: Some(0x1234_5678),
            ..Default::default()
        }
        .encode_to_vec()
    }

    pub fn request(&self) -> Vec<u8> {
        let msg = self.request_msg();
        SignedMessage {
            r#type: Some(MessageType::LicenseRequest as i32),
            signature: Some(self.signer.sign(&msg).unwrap()),
            msg: Some(msg),
            ..Default::default()
        }
        .encode_to_vec()
    }

    pub fn response(&self) -> Vec<u8> {
        let enc_key: [u8; 16] = derive(&SESSION_KEY, &self.request_msg(), 128)
            .unwrap()
            .try_into()
            .unwrap();

        let key = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (key_type, id, key))| {
                let iv = [i as u8 + 0x10; 16];
                let mut entry = content_entry(id, key, &enc_key, &iv);
                entry.r#type = Some(*key_type as i32);
                if id.is_empty() {
                    entry.id = None;
                }
                entry
            })
            .collect();
        let license = License {
            key,
            license_start_time: Some(1_700_000_001),
            ..Default::default()
        };

        SignedMessage {
            r#type: Some(MessageType::License as i32),
            msg: Some(license.encode_to_vec()),
            signature: Some(vec![0x00; 32]),
            session_key: Some(self.recipient.encrypt(&SESSION_KEY).unwrap()),
            session_key_type: Some(SessionKeyType::WrappedAesKey as i32),
            ..Default::default()
        }
        .encode_to_vec()
    }
}
