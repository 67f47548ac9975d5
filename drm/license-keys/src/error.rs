use core::fmt;

use thiserror::Error;

use crate::exchange::ExchangeStage;

/**
    Fatal key-material errors.

    Any of these means the configured key pair is unusable; no exchange can
    be evaluated until the material is corrected. Cloneable so a failed
    one-time initialization can be handed to every later caller.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    // ── Configuration ─────────────────────────────────────────────────
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    // ── PEM / DER ─────────────────────────────────────────────────────
    #[error("malformed PEM: {0}")]
    Pem(String),
    #[error("invalid base64 in PEM body: {0}")]
    InvalidBase64(String),
    #[error("RSA public key parse failed: {0}")]
    PublicKeyParse(String),
    #[error("RSA private key parse failed: {0}")]
    PrivateKeyParse(String),

    // ── Consistency ───────────────────────────────────────────────────
    #[error("key pair self-test failed: the public key does not match the private key")]
    SelfTestFailed,
}

/**
    A public-key operation failed (bad padding, wrong key, oversized input).
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("RSA operation failed: {0}")]
pub struct RsaOperationError(pub String);

/**
    Caller-contract violations of the key derivation function.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeriveError {
    #[error("session key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("output size must be a positive multiple of 8 bits up to 32640, got {0}")]
    InvalidOutputSize(u32),
}

/**
    Why a single key entry could not be unwrapped.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnwrapError {
    #[error("key entry has no {0} field")]
    Missing(&'static str),
    #[error("key entry {field} is {len} bytes, need at least 16")]
    Truncated { field: &'static str, len: usize },
}

/**
    An [`UnwrapError`] tagged with the position and identifier of the entry.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key entry {index} (id {}): {source}", hex::encode(.id))]
pub struct EntryUnwrapError {
    /// Position of the entry in the license, counting every entry type.
    pub index: usize,
    pub id: Vec<u8>,
    #[source]
    pub source: UnwrapError,
}

/**
    The message codec could not decode a buffer.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<drm_license_proto::prost::DecodeError> for CodecError {
    fn from(e: drm_license_proto::prost::DecodeError) -> Self {
        Self(e.to_string())
    }
}

/**
    Which message of an exchange an error refers to.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Response,
    License,
}

impl MessageKind {
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Request => "license request",
            Self::Response => "license response",
            Self::License => "license",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

/**
    Recoverable, per-exchange failures.

    None of these say anything about the key material; the caller logs the
    reason and moves on to the next exchange.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    // ── Decoding ──────────────────────────────────────────────────────
    #[error("failed to decode {message}: {source}")]
    Decode {
        message: MessageKind,
        #[source]
        source: CodecError,
    },
    #[error("{message} has no {field} field")]
    MissingField {
        message: MessageKind,
        field: &'static str,
    },
    #[error("response is message type {0}, expected LICENSE")]
    UnexpectedResponseType(i32),

    // ── Authenticity ──────────────────────────────────────────────────
    #[error("license request signature does not verify under the device key")]
    SignatureMismatch,

    // ── Session key ───────────────────────────────────────────────────
    #[error("license response carries no session key")]
    SessionKeyMissing,
    #[error("session key decryption failed: {0}")]
    SessionKeyDecryption(#[source] RsaOperationError),
    #[error("session key is {0} bytes, expected 16")]
    SessionKeyLength(usize),

    // ── Content keys ──────────────────────────────────────────────────
    #[error(transparent)]
    KeyUnwrap(#[from] EntryUnwrapError),
}

impl ExchangeError {
    /**
        The state the exchange was trying to reach when it failed.
    */
    pub const fn stage(&self) -> ExchangeStage {
        match self {
            Self::Decode { message, .. } | Self::MissingField { message, .. } => match message {
                MessageKind::Request => ExchangeStage::RequestDecoded,
                MessageKind::Response | MessageKind::License => ExchangeStage::ResponseDecoded,
            },
            Self::UnexpectedResponseType(_) => ExchangeStage::ResponseDecoded,
            Self::SignatureMismatch => ExchangeStage::SignatureVerified,
            Self::SessionKeyMissing | Self::SessionKeyDecryption(_) | Self::SessionKeyLength(_) => {
                ExchangeStage::SessionKeyUnwrapped
            }
            Self::KeyUnwrap(_) => ExchangeStage::Complete,
        }
    }
}

/**
    Type alias for results that may return a [`KeyError`].
*/
pub type KeyResult<T> = std::result::Result<T, KeyError>;
