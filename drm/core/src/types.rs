use core::fmt;
use core::str::FromStr;

use crate::error::{ContentKeyError, ParseError};
use crate::utils::{eq_ignore_ascii_case, normalize_kid};

/**
    Length in bytes of an unwrapped content key (one AES-128 block).
*/
pub const CONTENT_KEY_LEN: usize = 16;

/**
    Key type enumeration from License.KeyContainer.KeyType.

    Only [`KeyType::Content`] entries carry keys that decrypt media; the
    other types are read so they can be skipped or inspected.
*/
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyType {
    Signing = 1,
    Content = 2,
    KeyControl = 3,
    OperatorSession = 4,
    Entitlement = 5,
    OemContent = 6,
}

impl KeyType {
    pub const fn from_name(name: &[u8]) -> Option<Self> {
        let name = name.trim_ascii();
        match name.len() {
            7 if eq_ignore_ascii_case(name, b"signing") => Some(Self::Signing),
            7 if eq_ignore_ascii_case(name, b"content") => Some(Self::Content),
            11 if eq_ignore_ascii_case(name, b"key_control") => Some(Self::KeyControl),
            11 if eq_ignore_ascii_case(name, b"oem_content") => Some(Self::OemContent),
            11 if eq_ignore_ascii_case(name, b"entitlement") => Some(Self::Entitlement),
            16 if eq_ignore_ascii_case(name, b"operator_session") => Some(Self::OperatorSession),
            _ => None,
        }
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Signing => "SIGNING",
            Self::Content => "CONTENT",
            Self::KeyControl => "KEY_CONTROL",
            Self::OperatorSession => "OPERATOR_SESSION",
            Self::Entitlement => "ENTITLEMENT",
            Self::OemContent => "OEM_CONTENT",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for KeyType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.as_bytes()).ok_or_else(|| ParseError {
            kind: "key type",
            value: s.to_owned(),
        })
    }
}

/**
    A content decryption key unwrapped from a license response.

    The identifier is kept exactly as carried by the key entry; [`ContentKey::kid`]
    offers the normalized 16-byte view used by packagers and players.

    `Display` prints `id_hex:key_hex`.
*/
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    id: Vec<u8>,
    key: [u8; CONTENT_KEY_LEN],
}

impl ContentKey {
    /**
        Create a content key, checking that `key` is exactly one AES block.
    */
    pub fn new(id: impl AsRef<[u8]>, key: impl AsRef<[u8]>) -> Result<Self, ContentKeyError> {
        let key: &[u8] = key.as_ref();
        let key: [u8; CONTENT_KEY_LEN] = key
            .try_into()
            .map_err(|_| ContentKeyError::InvalidKeyLength(key.len()))?;
        Ok(Self::from_parts(id.as_ref().to_vec(), key))
    }

    pub fn from_parts(id: Vec<u8>, key: [u8; CONTENT_KEY_LEN]) -> Self {
        Self { id, key }
    }

    /**
        Raw identifier bytes from the key entry (may be empty).
    */
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /**
        Identifier normalized to 16 bytes, see [`normalize_kid`].
    */
    pub fn kid(&self) -> [u8; 16] {
        normalize_kid(&self.id)
    }

    pub fn key(&self) -> &[u8; CONTENT_KEY_LEN] {
        &self.key
    }

    pub fn id_hex(&self) -> String {
        hex::encode(&self.id)
    }

    pub fn key_hex(&self) -> String {
        hex::encode(self.key)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id_hex(), self.key_hex())
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ContentKey({}:{})",
            hex::encode(&self.id),
            hex::encode(self.key)
        )
    }
}

/**
    Parse a content key from `id_hex:key_hex` format.
*/
impl FromStr for ContentKey {
    type Err = ContentKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id_hex, key_hex) = s.split_once(':').ok_or(ContentKeyError::InvalidFormat)?;
        let id =
            hex::decode(id_hex.trim()).map_err(|e| ContentKeyError::InvalidHex(e.to_string()))?;
        let key =
            hex::decode(key_hex.trim()).map_err(|e| ContentKeyError::InvalidHex(e.to_string()))?;
        Self::new(id, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn sample_key() -> ContentKey {
        ContentKey::new(
            hex!("00000000000000000000000000000001"),
            hex!("00112233445566778899aabbccddeeff"),
        )
        .unwrap()
    }

    #[test]
    fn wrong_key_length_rejected() {
        let err = ContentKey::new([0; 16], [0x01; 15]).unwrap_err();
        assert_eq!(err, ContentKeyError::InvalidKeyLength(15));
        let err = ContentKey::new([0; 16], [0x01; 32]).unwrap_err();
        assert_eq!(err, ContentKeyError::InvalidKeyLength(32));
    }

    #[test]
    fn empty_id_is_allowed() {
        let key = ContentKey::new([0u8; 0], [0x42; 16]).unwrap();
        assert!(key.id().is_empty());
        assert_eq!(key.kid(), [0; 16]);
    }

    #[test]
    fn raw_id_is_preserved() {
        let key = ContentKey::new(b"video-hd", [0x42; 16]).unwrap();
        assert_eq!(key.id(), b"video-hd");
        assert_eq!(&key.kid()[..8], b"video-hd");
    }

    #[test]
    fn display_is_id_colon_key() {
        assert_eq!(
            sample_key().to_string(),
            "00000000000000000000000000000001:00112233445566778899aabbccddeeff"
        );
    }

    #[test]
    fn from_str_round_trip() {
        let original = sample_key();
        let parsed: ContentKey = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn from_str_with_whitespace() {
        let key: ContentKey = " 0a0b : 00112233445566778899aabbccddeeff "
            .parse()
            .unwrap();
        assert_eq!(key.id(), &[0x0a, 0x0b]);
        assert_eq!(key.key(), &hex!("00112233445566778899aabbccddeeff"));
    }

    #[test]
    fn from_str_missing_colon() {
        let err = "00112233445566778899aabbccddeeff"
            .parse::<ContentKey>()
            .unwrap_err();
        assert_eq!(err, ContentKeyError::InvalidFormat);
    }

    #[test]
    fn from_str_invalid_hex() {
        let err = "zz:00112233445566778899aabbccddeeff"
            .parse::<ContentKey>()
            .unwrap_err();
        assert!(matches!(err, ContentKeyError::InvalidHex(_)));
    }

    #[test]
    fn hex_accessors() {
        let key = sample_key();
        assert_eq!(key.id_hex(), "00000000000000000000000000000001");
        assert_eq!(key.key_hex(), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn key_type_display() {
        assert_eq!(KeyType::Content.to_string(), "CONTENT");
        assert_eq!(KeyType::KeyControl.to_string(), "KEY_CONTROL");
        assert_eq!(KeyType::OperatorSession.to_string(), "OPERATOR_SESSION");
    }

    #[test]
    fn key_type_name_round_trip() {
        for kt in [
            KeyType::Signing,
            KeyType::Content,
            KeyType::KeyControl,
            KeyType::OperatorSession,
            KeyType::Entitlement,
            KeyType::OemContent,
        ] {
            assert_eq!(KeyType::from_name(kt.to_name().as_bytes()), Some(kt));
        }
        assert_eq!(KeyType::from_name(b"KEY-CONTROL"), None);
        assert_eq!(KeyType::from_name(b""), None);
    }

    #[test]
    fn key_type_from_str() {
        assert_eq!(" content ".parse::<KeyType>().unwrap(), KeyType::Content);
        let err = "nope".parse::<KeyType>().unwrap_err();
        assert_eq!(err.kind, "key type");
    }
}
