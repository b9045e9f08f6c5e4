//! Symmetric cipher units and bulk-key generation

pub mod aes256cfb;
pub mod aes256gcm;

pub use aes256cfb::Aes256CfbCipher;
pub use aes256gcm::Aes256GcmCipher;

use crate::error::{Error, Result};
use crate::{SymmetricCipher, BULK_KEY_SIZE, CFB_IV_SIZE, GCM_NONCE_SIZE};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Symmetric construction used for the record ciphertext
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherSuite {
    /// AES-256 in 128-bit cipher feedback mode. No integrity protection; the
    /// signature check is the only tamper defense. Wire-compatible default.
    #[default]
    Aes256Cfb,
    /// AES-256-GCM. Tampered ciphertext fails to decrypt.
    Aes256Gcm,
}

impl CipherSuite {
    /// Algorithm label carried in the envelope `alg` field
    pub fn wire_alg(self) -> &'static str {
        match self {
            CipherSuite::Aes256Cfb => "A256CFB",
            CipherSuite::Aes256Gcm => "A256GCM",
        }
    }

    /// Resolves an envelope `alg` field; an absent field means CFB
    pub fn from_wire_alg(alg: Option<&str>) -> Result<Self> {
        match alg {
            None | Some("A256CFB") => Ok(CipherSuite::Aes256Cfb),
            Some("A256GCM") => Ok(CipherSuite::Aes256Gcm),
            Some(other) => Err(Error::MalformedPayload(format!(
                "unsupported cipher suite `{}`",
                other
            ))),
        }
    }

    /// Length in bytes of the iv (or nonce) this suite expects
    pub fn iv_len(self) -> usize {
        match self {
            CipherSuite::Aes256Cfb => CFB_IV_SIZE,
            CipherSuite::Aes256Gcm => GCM_NONCE_SIZE,
        }
    }

    /// True when decryption detects tampering on its own
    pub fn is_authenticated(self) -> bool {
        matches!(self, CipherSuite::Aes256Gcm)
    }

    /// The cipher implementing this suite
    pub fn cipher(self) -> Arc<dyn SymmetricCipher> {
        match self {
            CipherSuite::Aes256Cfb => Arc::new(Aes256CfbCipher::new()),
            CipherSuite::Aes256Gcm => Arc::new(Aes256GcmCipher::new()),
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_alg())
    }
}

/// Fills a buffer with cryptographically secure random bytes
pub fn fill_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

/// Generates a random byte vector of the specified size
pub fn get_rand_bytes(size: usize) -> Vec<u8> {
    let mut bytes = vec![0_u8; size];
    fill_random(&mut bytes);
    bytes
}

/// Generates a fresh 256-bit bulk key
pub fn generate_key() -> Zeroizing<[u8; BULK_KEY_SIZE]> {
    let mut key = Zeroizing::new([0_u8; BULK_KEY_SIZE]);
    fill_random(&mut key[..]);
    key
}

/// Generates a fresh 128-bit CFB iv
pub fn generate_iv() -> [u8; CFB_IV_SIZE] {
    let mut iv = [0_u8; CFB_IV_SIZE];
    fill_random(&mut iv);
    iv
}

/// One-time bulk key and iv for a single encryption.
///
/// The key is wiped when the secret is dropped.
pub struct SymmetricSecret {
    key: Zeroizing<[u8; BULK_KEY_SIZE]>,
    iv: Vec<u8>,
}

impl fmt::Debug for SymmetricSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricSecret")
            .field("key", &"<hidden>")
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

impl SymmetricSecret {
    /// Generates a fresh key and an iv sized for `suite`
    pub fn generate(suite: CipherSuite) -> Self {
        Self {
            key: generate_key(),
            iv: get_rand_bytes(suite.iv_len()),
        }
    }

    /// Rebuilds a secret from an unwrapped key and a received iv
    pub fn from_parts(key: &[u8], iv: Vec<u8>) -> Result<Self> {
        let key: [u8; BULK_KEY_SIZE] = key.try_into().map_err(|_| {
            Error::Unwrap(format!(
                "bulk key must be {} bytes, got {}",
                BULK_KEY_SIZE,
                key.len()
            ))
        })?;
        Ok(Self {
            key: Zeroizing::new(key),
            iv,
        })
    }

    /// The bulk key
    pub fn key(&self) -> &[u8] {
        &self.key[..]
    }

    /// The iv or nonce
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Consumes the secret, keeping only the iv
    pub fn into_iv(self) -> Vec<u8> {
        self.iv
    }
}

pub(crate) fn check_lengths(suite: CipherSuite, key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() != BULK_KEY_SIZE {
        return Err(Error::InvalidArgument(format!(
            "{} key must be {} bytes, got {}",
            suite,
            BULK_KEY_SIZE,
            key.len()
        )));
    }
    if iv.len() != suite.iv_len() {
        return Err(Error::InvalidArgument(format!(
            "{} iv must be {} bytes, got {}",
            suite,
            suite.iv_len(),
            iv.len()
        )));
    }
    Ok(())
}
