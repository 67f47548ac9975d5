/*!
    Cryptographic primitives of the license exchange.

    Asymmetric (RSA, 2048-bit device key):
    - RSA-OAEP-SHA1 for the session key carried in the license response
    - RSA-PSS-SHA1 (20-byte salt) for license request signatures

    Symmetric:
    - AES-128-CMAC as the PRF of the counter-mode key derivation
    - AES-128-CBC (single block, no padding) for wrapped content keys
*/

pub(crate) mod aes;
pub(crate) mod rsa;
