#![allow(clippy::doc_overindented_list_items)]

mod codec;
mod crypto;
mod derive;
mod error;
mod exchange;
mod pem;
mod provisioning;
mod unwrap;

#[cfg(test)]
mod fixtures;

pub mod proto {
    pub use drm_license_proto::prost::Message;
    pub use drm_license_proto::*;
}

// Re-export shared DRM types from drm-core
pub use drm_core::{ContentKey, KeyType, normalize_kid};

pub use self::codec::{MessageCodec, ProstCodec};
pub use self::derive::{
    ENC_KEY_BITS, ENCRYPTION_LABEL, build_context, build_enc_context, derive, derive_with_label,
    kdf_input,
};
pub use self::error::{
    CodecError, DeriveError, EntryUnwrapError, ExchangeError, KeyError, KeyResult, MessageKind,
    RsaOperationError, UnwrapError,
};
pub use self::exchange::{
    ExchangeOptions, ExchangeOutcome, ExchangeStage, LicenseExchange, UnwrapPolicy,
};
pub use self::pem::pem_to_der;
pub use self::provisioning::{DeviceKeys, KeyMaterial, KeyPair};
pub use self::unwrap::{unwrap_content_keys, unwrap_entry};
