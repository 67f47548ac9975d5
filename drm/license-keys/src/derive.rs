use crate::crypto::aes::{AES_BLOCK_SIZE, aes_cmac};
use crate::error::DeriveError;

/// Purpose label of the content-key encryption key.
pub const ENCRYPTION_LABEL: &[u8] = b"ENCRYPTION";

/// Output size the license exchange requests, in bits.
pub const ENC_KEY_BITS: u32 = 128;

/// Largest output the one-byte counter can address (255 CMAC blocks).
const MAX_OUTPUT_BITS: u32 = 255 * (AES_BLOCK_SIZE as u32) * 8;

/**
    Build a derivation context.

    Returns: label || 0x00 || request_bytes || BE32(output_bits)

    The request bytes are the raw serialized LicenseRequest, never re-encoded.
*/
pub fn build_context(label: &[u8], request_bytes: &[u8], output_bits: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(label.len() + 1 + request_bytes.len() + 4);
    out.extend_from_slice(label);
    out.push(0x00);
    out.extend_from_slice(request_bytes);
    out.extend_from_slice(&output_bits.to_be_bytes());
    out
}

/**
    Build the encryption derivation context from serialized LicenseRequest bytes.

    Returns: b"ENCRYPTION" || 0x00 || request_bytes || [0x00, 0x00, 0x00, 0x80]
*/
pub fn build_enc_context(request_bytes: &[u8]) -> Vec<u8> {
    build_context(ENCRYPTION_LABEL, request_bytes, ENC_KEY_BITS)
}

/**
    The exact CMAC input for one counter block: counter || context.
*/
pub fn kdf_input(counter: u8, context: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(1 + context.len());
    msg.push(counter);
    msg.extend_from_slice(context);
    msg
}

/**
    Counter-mode AES-128-CMAC key derivation with the `"ENCRYPTION"` label.

    See [`derive_with_label`].
*/
pub fn derive(session_key: &[u8], request_bytes: &[u8], output_bits: u32) -> Result<Vec<u8>, DeriveError> {
    derive_with_label(session_key, ENCRYPTION_LABEL, request_bytes, output_bits)
}

/**
    Counter-mode AES-128-CMAC key derivation (NIST SP 800-108).

      block_i = CMAC(session_key, [i] || build_context(label, request_bytes, output_bits))

    for i = 1, 2, ... until `output_bits` are covered; the concatenation is
    truncated to `output_bits / 8` bytes. A 128-bit request is one block.

    Fails if `session_key` is not 16 bytes or `output_bits` is zero, not a
    multiple of 8, or larger than the counter can address.

    A wrong key length is a typed error here, not a panic: this is a public
    entry point for arbitrary callers. [`LicenseExchange`] never reaches it
    with a bad key; it reports a session key that is not one AES block as
    [`ExchangeError::SessionKeyLength`] and derives through a `[u8; 16]`.

    [`LicenseExchange`]: crate::LicenseExchange
    [`ExchangeError::SessionKeyLength`]: crate::ExchangeError::SessionKeyLength
*/
pub fn derive_with_label(
    session_key: &[u8],
    label: &[u8],
    request_bytes: &[u8],
    output_bits: u32,
) -> Result<Vec<u8>, DeriveError> {
    let key: &[u8; 16] = session_key
        .try_into()
        .map_err(|_| DeriveError::InvalidKeyLength(session_key.len()))?;
    if output_bits == 0 || output_bits % 8 != 0 || output_bits > MAX_OUTPUT_BITS {
        return Err(DeriveError::InvalidOutputSize(output_bits));
    }

    let context = build_context(label, request_bytes, output_bits);
    let output_len = (output_bits / 8) as usize;
    let mut out = Vec::with_capacity(output_len.next_multiple_of(AES_BLOCK_SIZE));
    let mut counter = 1u8;
    while out.len() < output_len {
        out.extend_from_slice(&aes_cmac(key, &kdf_input(counter, &context)));
        counter = counter.wrapping_add(1);
    }
    out.truncate(output_len);
    Ok(out)
}

/**
    The 128-bit content-key encryption key of one exchange.
*/
pub(crate) fn derive_enc_key(session_key: &[u8; 16], request_bytes: &[u8]) -> [u8; 16] {
    aes_cmac(session_key, &kdf_input(0x01, &build_enc_context(request_bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const SESSION_KEY: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

    #[test]
    fn enc_context_is_byte_exact() {
        let input = kdf_input(0x01, &build_enc_context(b"ABCD"));
        assert_eq!(input.len(), 20);
        assert_eq!(
            input,
            hex!("01 454e4352595054494f4e 00 41424344 00000080")
        );
    }

    #[test]
    fn context_carries_label_and_size() {
        let ctx = build_context(b"AUTHENTICATION", b"req", 512);
        assert!(ctx.starts_with(b"AUTHENTICATION\x00"));
        assert_eq!(&ctx[15..18], b"req");
        assert_eq!(&ctx[ctx.len() - 4..], &[0x00, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn derive_128_matches_reference_vector() {
        let key = derive(&SESSION_KEY, b"ABCD", 128).unwrap();
        assert_eq!(key, hex!("e69369dfef6a502107a6038c0519efc3"));
        assert_eq!(derive_enc_key(&SESSION_KEY, b"ABCD").to_vec(), key);
    }

    #[test]
    fn derive_256_loops_the_counter() {
        let key = derive(&SESSION_KEY, b"ABCD", 256).unwrap();
        assert_eq!(
            key,
            hex!(
                "d3aca1d759623c86da182e8045b67ee1"
                "09a2f3cba0383d77e17b6320d8b5072e"
            )
        );
    }

    #[test]
    fn derive_truncates_partial_blocks() {
        let key = derive(&SESSION_KEY, b"ABCD", 64).unwrap();
        assert_eq!(key.len(), 8);
        let key = derive(&SESSION_KEY, b"ABCD", 136).unwrap();
        assert_eq!(key.len(), 17);
    }

    #[test]
    fn derive_is_deterministic() {
        let request = b"serialized license request bytes";
        assert_eq!(
            derive(&SESSION_KEY, request, 128).unwrap(),
            derive(&SESSION_KEY, request, 128).unwrap()
        );
    }

    #[test]
    fn any_request_byte_changes_the_key() {
        let request = b"serialized license request bytes".to_vec();
        let base = derive(&SESSION_KEY, &request, 128).unwrap();
        for i in 0..request.len() {
            let mut mutated = request.clone();
            mutated[i] ^= 0x01;
            assert_ne!(derive(&SESSION_KEY, &mutated, 128).unwrap(), base, "byte {i}");
        }
    }

    #[test]
    fn wrong_session_key_length_is_rejected() {
        assert_eq!(
            derive(&[0u8; 15], b"ABCD", 128),
            Err(DeriveError::InvalidKeyLength(15))
        );
        assert_eq!(
            derive(&[0u8; 32], b"ABCD", 128),
            Err(DeriveError::InvalidKeyLength(32))
        );
    }

    #[test]
    fn invalid_output_sizes_are_rejected() {
        for bits in [0, 7, 129, MAX_OUTPUT_BITS + 8] {
            assert_eq!(
                derive(&SESSION_KEY, b"ABCD", bits),
                Err(DeriveError::InvalidOutputSize(bits))
            );
        }
        assert!(derive(&SESSION_KEY, b"ABCD", MAX_OUTPUT_BITS).is_ok());
    }
}
