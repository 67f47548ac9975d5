use aes::Aes128;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, generic_array::GenericArray};
use cmac::{Cmac, Mac};

/// AES block size in bytes.
pub(crate) const AES_BLOCK_SIZE: usize = 16;

/**
    Single AES-128-CMAC computation (RFC 4493).
    Key: 16-byte AES key (the session key).
    Message: arbitrary bytes (counter_byte || context_bytes assembled by caller).
    Output: 16 bytes (one AES block).
*/
pub(crate) fn aes_cmac(key: &[u8; 16], message: &[u8]) -> [u8; 16] {
    let mut mac = <Cmac<Aes128> as Mac>::new(key.into());
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/**
    AES-128-CBC decryption of exactly one block.

    With a single block CBC reduces to `AES-DEC(key, block) XOR iv`. No
    padding is stripped: an unwrapped content key is one full block.
*/
pub(crate) fn aes_cbc_decrypt_block(
    key: &[u8; 16],
    iv: &[u8; 16],
    block: &[u8; AES_BLOCK_SIZE],
) -> [u8; AES_BLOCK_SIZE] {
    let mut out = *block;
    cbc::Decryptor::<Aes128>::new(key.into(), iv.into())
        .decrypt_block_mut(GenericArray::from_mut_slice(&mut out));
    out
}
