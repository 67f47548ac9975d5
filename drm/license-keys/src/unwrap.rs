use drm_core::{ContentKey, KeyType};
use drm_license_proto::license::KeyContainer;

use crate::crypto::aes::{AES_BLOCK_SIZE, aes_cbc_decrypt_block};
use crate::error::{EntryUnwrapError, UnwrapError};

/**
    Unwrap every CONTENT entry of a license with the derived encryption key.

    Entries of any other type (or with no type) are passed over. For each
    CONTENT entry, in license order, the first 16 bytes of `key` are
    decrypted as a single AES-128-CBC block under the first 16 bytes of
    `iv`. Servers usually send the key PKCS#7-padded to 32 bytes; the padding
    block is never touched.

    Each item is that entry's outcome, so the caller chooses whether one bad
    entry aborts the exchange or is skipped.
*/
pub fn unwrap_content_keys<'a>(
    entries: &'a [KeyContainer],
    enc_key: &'a [u8; 16],
) -> impl Iterator<Item = Result<ContentKey, EntryUnwrapError>> + 'a {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.key_type() == Some(KeyType::Content))
        .map(move |(index, entry)| unwrap_entry(entry, enc_key).map_err(|source| EntryUnwrapError {
            index,
            id: entry.id.clone().unwrap_or_default(),
            source,
        }))
}

/**
    Unwrap a single entry regardless of its type.
*/
pub fn unwrap_entry(entry: &KeyContainer, enc_key: &[u8; 16]) -> Result<ContentKey, UnwrapError> {
    let wrapped = first_block(entry.key.as_deref(), "key")?;
    let iv = first_block(entry.iv.as_deref(), "iv")?;
    let key = aes_cbc_decrypt_block(enc_key, iv, wrapped);
    Ok(ContentKey::from_parts(entry.id.clone().unwrap_or_default(), key))
}

fn first_block<'a>(
    field: Option<&'a [u8]>,
    name: &'static str,
) -> Result<&'a [u8; AES_BLOCK_SIZE], UnwrapError> {
    let bytes = field.ok_or(UnwrapError::Missing(name))?;
    bytes
        .first_chunk::<AES_BLOCK_SIZE>()
        .ok_or(UnwrapError::Truncated {
            field: name,
            len: bytes.len(),
        })
}
