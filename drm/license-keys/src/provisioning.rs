use core::fmt;
use std::path::Path;
use std::sync::OnceLock;

use rsa::traits::PublicKeyParts;
use rsa::{oaep, pss};
use sha1::Sha1;
use tracing::{debug, error};

use crate::crypto::rsa::{
    PSS_SALT_LEN, oaep_sha1_decrypt, oaep_sha1_encrypt, private_key_from_der,
    pss_sha1_sign, pss_sha1_verify, public_key_from_der,
};
use crate::error::{KeyError, KeyResult, RsaOperationError};
use crate::pem::pem_to_der;

/// Plaintext round-tripped through the OAEP bindings by the self-test.
const SELF_TEST_PLAINTEXT: &[u8] = b"ABCD";

/**
    PEM-encoded device key material, as persisted in configuration.

    `Debug` never prints the private half.
*/
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    public_pem: String,
    private_pem: String,
}

impl KeyMaterial {
    pub fn new(public_pem: impl Into<String>, private_pem: impl Into<String>) -> Self {
        Self {
            public_pem: public_pem.into(),
            private_pem: private_pem.into(),
        }
    }

    /**
        Read both halves from PEM files.
    */
    pub fn from_files(public_path: impl AsRef<Path>, private_path: impl AsRef<Path>) -> KeyResult<Self> {
        Ok(Self::new(
            read_pem(public_path.as_ref())?,
            read_pem(private_path.as_ref())?,
        ))
    }

    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }

    pub fn private_pem(&self) -> &str {
        &self.private_pem
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_pem", &format_args!("{} bytes", self.public_pem.len()))
            .field("private_pem", &"<redacted>")
            .finish()
    }
}

fn read_pem(path: &Path) -> KeyResult<String> {
    std::fs::read_to_string(path).map_err(|e| KeyError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/**
    The device RSA key pair, imported once into each algorithm binding it
    is used with.

    - OAEP-SHA1 decryption (private half): unwraps session keys.
    - OAEP-SHA1 encryption (public half): used by the self-test.
    - PSS-SHA1 verification (public half): checks license request signatures.
    - PSS-SHA1 signing (private half): produces request signatures.

    Immutable after construction; shared read-only across exchanges.
*/
pub struct KeyPair {
    decrypting: oaep::DecryptingKey<Sha1>,
    encrypting: oaep::EncryptingKey<Sha1>,
    verifying: pss::VerifyingKey<Sha1>,
    signing: pss::SigningKey<Sha1>,
    modulus_bits: usize,
}

impl KeyPair {
    /**
        Import both PEM halves into all four bindings.

        The public half may be SubjectPublicKeyInfo or PKCS#1, the private
        half PKCS#8 or PKCS#1. No consistency check is made here; see
        [`KeyPair::self_test`] and [`KeyPair::initialize`].
    */
    pub fn from_pem(public_pem: &str, private_pem: &str) -> KeyResult<Self> {
        let public_key = public_key_from_der(&pem_to_der(public_pem)?)?;
        let private_key = private_key_from_der(&pem_to_der(private_pem)?)?;

        Ok(Self {
            modulus_bits: public_key.n().bits(),
            decrypting: oaep::DecryptingKey::new(private_key.clone()),
            encrypting: oaep::EncryptingKey::new(public_key.clone()),
            verifying: pss::VerifyingKey::new_with_salt_len(public_key, PSS_SALT_LEN),
            signing: pss::SigningKey::new_with_salt_len(private_key, PSS_SALT_LEN),
        })
    }

    /**
        Import and self-test. A pair that fails the self-test is rejected
        with [`KeyError::SelfTestFailed`].
    */
    pub fn initialize(material: &KeyMaterial) -> KeyResult<Self> {
        let pair = Self::from_pem(&material.public_pem, &material.private_pem)?;
        if !pair.self_test() {
            return Err(KeyError::SelfTestFailed);
        }
        debug!(modulus_bits = pair.modulus_bits, "device key pair imported and self-tested");
        Ok(pair)
    }

    /**
        Encrypt a fixed plaintext with the public half and decrypt it with
        the private half. `true` only on a byte-exact round trip.
    */
    pub fn self_test(&self) -> bool {
        let Ok(ciphertext) = self.encrypt(SELF_TEST_PLAINTEXT) else {
            return false;
        };
        matches!(
            self.unwrap_session_key(&ciphertext),
            Ok(plaintext) if plaintext == SELF_TEST_PLAINTEXT
        )
    }

    /**
        RSA-PSS-SHA1 (20-byte salt) verification over the raw message bytes.
    */
    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> bool {
        pss_sha1_verify(&self.verifying, message, signature)
    }

    /**
        RSA-OAEP-SHA1 decryption of a wrapped session key.
    */
    pub fn unwrap_session_key(&self, wrapped: &[u8]) -> Result<Vec<u8>, RsaOperationError> {
        oaep_sha1_decrypt(&self.decrypting, wrapped)
    }

    /**
        RSA-OAEP-SHA1 encryption with the public half.
    */
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, RsaOperationError> {
        oaep_sha1_encrypt(&self.encrypting, plaintext)
    }

    /**
        RSA-PSS-SHA1 (20-byte salt) signature with the private half.
    */
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, RsaOperationError> {
        pss_sha1_sign(&self.signing, message)
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("modulus_bits", &self.modulus_bits)
            .finish_non_exhaustive()
    }
}

/**
    Lazily imported, single-flight device keys.

    The first call to [`DeviceKeys::ensure_initialized`] imports and
    self-tests the material; concurrent first callers block until that one
    import finishes and then all observe the same [`KeyPair`]. A failure is
    cached too: broken key material stays broken until the process is
    reconfigured.
*/
pub struct DeviceKeys {
    material: KeyMaterial,
    pair: OnceLock<KeyResult<KeyPair>>,
}

impl DeviceKeys {
    pub fn new(material: KeyMaterial) -> Self {
        Self {
            material,
            pair: OnceLock::new(),
        }
    }

    /**
        Import and self-test on first use; return the cached outcome after.
    */
    pub fn ensure_initialized(&self) -> KeyResult<&KeyPair> {
        self.pair
            .get_or_init(|| {
                KeyPair::initialize(&self.material).inspect_err(|e| {
                    error!(error = %e, "device key material rejected");
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /**
        `true` once a successful initialization has completed.
    */
    pub fn is_ready(&self) -> bool {
        matches!(self.pair.get(), Some(Ok(_)))
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }
}

impl fmt::Debug for DeviceKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceKeys")
            .field("material", &self.material)
            .field("ready", &self.is_ready())
            .finish()
    }
}
