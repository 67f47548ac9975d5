/*!
    Wire schema for the signed license exchange messages.

    Only the fields the key-extraction path reads are declared. Every other
    field is skipped by the decoder, so messages from newer protocol
    revisions still decode. The module layout mirrors what `prost-build`
    emits for license_protocol.proto, so paths like
    `license::key_container::KeyType` match the upstream schema.
*/

pub mod license_protocol;

pub use license_protocol::*;

pub use prost;

// drm-core ↔ proto conversions

use drm_core::KeyType;

type ProtoKeyType = license::key_container::KeyType;

impl From<KeyType> for ProtoKeyType {
    fn from(kt: KeyType) -> Self {
        match kt {
            KeyType::Signing => Self::Signing,
            KeyType::Content => Self::Content,
            KeyType::KeyControl => Self::KeyControl,
            KeyType::OperatorSession => Self::OperatorSession,
            KeyType::Entitlement => Self::Entitlement,
            KeyType::OemContent => Self::OemContent,
        }
    }
}

impl From<ProtoKeyType> for KeyType {
    fn from(proto: ProtoKeyType) -> Self {
        match proto {
            ProtoKeyType::Signing => Self::Signing,
            ProtoKeyType::Content => Self::Content,
            ProtoKeyType::KeyControl => Self::KeyControl,
            ProtoKeyType::OperatorSession => Self::OperatorSession,
            ProtoKeyType::Entitlement => Self::Entitlement,
            ProtoKeyType::OemContent => Self::OemContent,
        }
    }
}

impl license::KeyContainer {
    /**
        The entry's key type, or `None` when the field is absent or carries
        a value this schema does not name.
    */
    pub fn key_type(&self) -> Option<KeyType> {
        self.r#type
            .and_then(|t| ProtoKeyType::try_from(t).ok())
            .map(KeyType::from)
    }

    /**
        Whether the entry's wire type is `kt`.
    */
    pub fn is_type(&self, kt: KeyType) -> bool {
        self.r#type == Some(ProtoKeyType::from(kt) as i32)
    }
}

impl SignedMessage {
    /**
        The message type, or `None` when absent or unrecognized.
    */
    pub fn message_type(&self) -> Option<signed_message::MessageType> {
        self.r#type
            .and_then(|t| signed_message::MessageType::try_from(t).ok())
    }
}
