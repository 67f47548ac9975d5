use thiserror::Error;

/**
    Error returned by `FromStr` implementations on enum types.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

/**
    Errors from constructing or parsing a [`ContentKey`](crate::ContentKey).
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentKeyError {
    #[error("content key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("expected 'id_hex:key_hex'")]
    InvalidFormat,

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
