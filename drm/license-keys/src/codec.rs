use drm_license_proto::prost::Message;
use drm_license_proto::{License, SignedMessage};

use crate::error::CodecError;

/**
    Decoder for the two wire messages of a license exchange.

    The engine depends only on this contract; [`ProstCodec`] is the
    schema-driven implementation backed by `drm-license-proto`.
*/
pub trait MessageCodec: Send + Sync {
    /**
        Decode a signed envelope (license request or license response).
    */
    fn decode_signed_message(&self, bytes: &[u8]) -> Result<SignedMessage, CodecError>;

    /**
        Decode the payload of a license response.
    */
    fn decode_license(&self, bytes: &[u8]) -> Result<License, CodecError>;
}

/**
    [`MessageCodec`] over the prost-derived license protocol schema.
*/
#[derive(Debug, Default, Clone, Copy)]
pub struct ProstCodec;

impl MessageCodec for ProstCodec {
    fn decode_signed_message(&self, bytes: &[u8]) -> Result<SignedMessage, CodecError> {
        Ok(SignedMessage::decode(bytes)?)
    }

    fn decode_license(&self, bytes: &[u8]) -> Result<License, CodecError> {
        Ok(License::decode(bytes)?)
    }
}
