use rsa::{
    RsaPrivateKey, RsaPublicKey, oaep,
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    pss,
    traits::{Decryptor, RandomizedEncryptor},
};
use sha1::Sha1;
use signature::{RandomizedSigner, Verifier};

use crate::error::{KeyError, RsaOperationError};

/// PSS salt length mandated by the protocol (the SHA-1 digest length).
pub(crate) const PSS_SALT_LEN: usize = 20;

/**
    Parse a DER public key: SubjectPublicKeyInfo first, PKCS#1 as fallback.
*/
pub(crate) fn public_key_from_der(der: &[u8]) -> Result<RsaPublicKey, KeyError> {
    RsaPublicKey::from_public_key_der(der).or_else(|spki_err| {
        RsaPublicKey::from_pkcs1_der(der)
            .map_err(|_| KeyError::PublicKeyParse(spki_err.to_string()))
    })
}

/**
    Parse a DER private key: PKCS#8 first, PKCS#1 as fallback.
*/
pub(crate) fn private_key_from_der(der: &[u8]) -> Result<RsaPrivateKey, KeyError> {
    RsaPrivateKey::from_pkcs8_der(der).or_else(|pkcs8_err| {
        RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|_| KeyError::PrivateKeyParse(pkcs8_err.to_string()))
    })
}

/**
    RSA-PSS-SHA1 verification of a license request signature.

    Parameters (all protocol-mandated, not implementation choices):
      Hash: SHA-1 (NOT SHA-256)
      MGF: MGF1-SHA-1
      Salt length: 20 bytes

    Input: the raw serialized LicenseRequest bytes (NOT pre-hashed). The
    verifying key hashes internally.

    Returns `false` for any malformed signature as well as for a mismatch.
*/
pub(crate) fn pss_sha1_verify(
    verifying_key: &pss::VerifyingKey<Sha1>,
    message: &[u8],
    signature: &[u8],
) -> bool {
    let Ok(signature) = pss::Signature::try_from(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/**
    RSA-PSS-SHA1 signing, the counterpart of [`pss_sha1_verify`].

    Pass the raw message bytes; pre-hashing would produce a double-hash and
    a signature no verifier accepts.
*/
pub(crate) fn pss_sha1_sign(
    signing_key: &pss::SigningKey<Sha1>,
    message: &[u8],
) -> Result<Vec<u8>, RsaOperationError> {
    let mut rng = rsa::rand_core::OsRng;
    let signature = signing_key
        .try_sign_with_rng(&mut rng, message)
        .map_err(|e| RsaOperationError(e.to_string()))?;

    let bytes: Box<[u8]> = signature.into();
    Ok(bytes.into_vec())
}

/**
    RSA-OAEP-SHA1 decryption for session key recovery.

    Parameters (protocol-mandated):
      Hash: SHA-1
      MGF: MGF1-SHA-1
      Label: empty (b"")

    Input: SignedMessage.session_key (field 4) from the license response.
    Output: session key bytes. The caller checks for the expected 16 bytes.
*/
pub(crate) fn oaep_sha1_decrypt(
    decrypting_key: &oaep::DecryptingKey<Sha1>,
    ciphertext: &[u8],
) -> Result<Vec<u8>, RsaOperationError> {
    decrypting_key
        .decrypt(ciphertext)
        .map_err(|e| RsaOperationError(e.to_string()))
}

/**
    RSA-OAEP-SHA1 encryption with the public half, same parameters as
    [`oaep_sha1_decrypt`]. Output size equals the modulus size.
*/
pub(crate) fn oaep_sha1_encrypt(
    encrypting_key: &oaep::EncryptingKey<Sha1>,
    plaintext: &[u8],
) -> Result<Vec<u8>, RsaOperationError> {
    let mut rng = rsa::rand_core::OsRng;
    encrypting_key
        .encrypt_with_rng(&mut rng, plaintext)
        .map_err(|e| RsaOperationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::pem::pem_to_der;

    fn private_key() -> RsaPrivateKey {
        let der = pem_to_der(fixtures::DEVICE_PRIVATE_PEM).unwrap();
        private_key_from_der(&der).unwrap()
    }

    #[test]
    fn pkcs8_and_pkcs1_encodings_parse_to_the_same_key() {
        let pkcs1 = pem_to_der(fixtures::DEVICE_PKCS1_PRIVATE_PEM).unwrap();
        assert_eq!(private_key_from_der(&pkcs1).unwrap(), private_key());
    }

    #[test]
    fn spki_public_key_matches_private_half() {
        let der = pem_to_der(fixtures::DEVICE_PUBLIC_PEM).unwrap();
        assert_eq!(public_key_from_der(&der).unwrap(), private_key().to_public_key());
    }

    #[test]
    fn pkcs1_public_key_matches_private_half() {
        let der = pem_to_der(fixtures::DEVICE_PKCS1_PUBLIC_PEM).unwrap();
        assert!(RsaPublicKey::from_public_key_der(&der).is_err());
        assert_eq!(public_key_from_der(&der).unwrap(), private_key().to_public_key());
    }

    #[test]
    fn garbage_der_is_rejected() {
        let err = public_key_from_der(b"not-a-der-key").unwrap_err();
        assert!(matches!(err, KeyError::PublicKeyParse(_)));
        let err = private_key_from_der(b"not-a-der-key").unwrap_err();
        assert!(matches!(err, KeyError::PrivateKeyParse(_)));
    }

    #[test]
    fn pss_sign_produces_verifiable_signature() {
        let key = private_key();
        let signing_key = pss::SigningKey::<Sha1>::new_with_salt_len(key.clone(), PSS_SALT_LEN);
        let verifying_key =
            pss::VerifyingKey::<Sha1>::new_with_salt_len(key.to_public_key(), PSS_SALT_LEN);

        let message = b"test license request bytes";
        let signature = pss_sha1_sign(&signing_key, message).unwrap();
        assert_eq!(signature.len(), 256);
        assert!(pss_sha1_verify(&verifying_key, message, &signature));
        assert!(!pss_sha1_verify(&verifying_key, b"other bytes", &signature));
        assert!(!pss_sha1_verify(&verifying_key, message, &signature[..255]));
    }

    #[test]
    fn pss_sign_is_nondeterministic() {
        let signing_key = pss::SigningKey::<Sha1>::new_with_salt_len(private_key(), PSS_SALT_LEN);
        let sig1 = pss_sha1_sign(&signing_key, b"same message").unwrap();
        let sig2 = pss_sha1_sign(&signing_key, b"same message").unwrap();
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn oaep_encrypt_decrypt_round_trip() {
        let key = private_key();
        let encrypting_key = oaep::EncryptingKey::<Sha1>::new(key.to_public_key());
        let decrypting_key = oaep::DecryptingKey::<Sha1>::new(key);

        let plaintext = [0x5a; 16];
        let ciphertext = oaep_sha1_encrypt(&encrypting_key, &plaintext).unwrap();
        assert_eq!(ciphertext.len(), 256);
        assert_eq!(oaep_sha1_decrypt(&decrypting_key, &ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn oaep_decrypt_garbage_fails() {
        let decrypting_key = oaep::DecryptingKey::<Sha1>::new(private_key());
        assert!(oaep_sha1_decrypt(&decrypting_key, &[0xFF; 256]).is_err());
    }
}
