use super::{check_lengths, CipherSuite};
use crate::error::{Error, Result};
use crate::SymmetricCipher;
use openssl::symm::{decrypt, encrypt, Cipher};

/// AES-256 in CFB128 mode
///
/// A stream construction: ciphertext length equals plaintext length and decrypting
/// with the wrong key or iv silently yields garbage rather than an error.
#[derive(Default, Debug, Clone)]
pub struct Aes256CfbCipher;

impl Aes256CfbCipher {
    /// Creates a new instance of the AES-256-CFB cipher
    pub fn new() -> Self {
        Self
    }
}

impl SymmetricCipher for Aes256CfbCipher {
    fn suite(&self) -> CipherSuite {
        CipherSuite::Aes256Cfb
    }

    fn encrypt(&self, plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        check_lengths(self.suite(), key, iv)?;

        encrypt(Cipher::aes_256_cfb128(), key, Some(iv), plaintext)
            .map_err(|e| Error::Cipher(format!("Encryption failed: {}", e)))
    }

    fn decrypt(&self, ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        check_lengths(self.suite(), key, iv)?;

        decrypt(Cipher::aes_256_cfb128(), key, Some(iv), ciphertext)
            .map_err(|e| Error::Cipher(format!("Decryption failed: {}", e)))
    }
}
