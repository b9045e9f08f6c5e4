use super::{check_lengths, CipherSuite};
use crate::error::{Error, Result};
use crate::{SymmetricCipher, GCM_TAG_SIZE};
use aes_gcm::{
    aead::{Aead as AeadTrait, KeyInit, Payload},
    Aes256Gcm, Key as AesKey, Nonce,
};

// Associated data binding the ciphertext to its suite label
const GCM_AAD: &[u8] = b"A256GCM";

/// AES-256-GCM implementation of the authenticated cipher suite
///
/// The 16-byte tag is appended to the ciphertext. Any modification of the
/// ciphertext, tag, nonce or key makes decryption fail with [`Error::Cipher`].
#[derive(Default, Debug, Clone)]
pub struct Aes256GcmCipher;

impl Aes256GcmCipher {
    /// Creates a new instance of the AES-256-GCM cipher
    pub fn new() -> Self {
        Self
    }
}

impl SymmetricCipher for Aes256GcmCipher {
    fn suite(&self) -> CipherSuite {
        CipherSuite::Aes256Gcm
    }

    fn encrypt(&self, plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        check_lengths(self.suite(), key, iv)?;

        let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key));
        let payload = Payload {
            msg: plaintext,
            aad: GCM_AAD,
        };

        cipher
            .encrypt(Nonce::from_slice(iv), payload)
            .map_err(|e| Error::Cipher(format!("Encryption failed: {}", e)))
    }

    fn decrypt(&self, ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        check_lengths(self.suite(), key, iv)?;

        if ciphertext.len() < GCM_TAG_SIZE {
            return Err(Error::Cipher(
                "Data length is too short for GCM (tag)".into(),
            ));
        }

        let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key));
        let payload = Payload {
            msg: ciphertext,
            aad: GCM_AAD,
        };

        cipher
            .decrypt(Nonce::from_slice(iv), payload)
            .map_err(|e| Error::Cipher(format!("Decryption failed: {}", e)))
    }
}
