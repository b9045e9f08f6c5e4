//! # certseal
//!
//! Tamper-evident, confidential certificate payloads that verify offline.
//!
//! An issuer signs a certificate's metadata record (RSA PKCS#1 v1.5 over SHA-256),
//! encrypts the signed record under a fresh bulk key, wraps that key for the
//! verifier with RSA-OAEP, and packs everything into a single base64 token suitable
//! for a QR code. A verifier holding the private key reverses the steps and checks
//! the signature before trusting any field.
//!
//! ```text
//! issue:   record -> sign -> canonical bytes -> encrypt -> wrap key -> envelope -> token
//! verify:  token -> envelope -> unwrap key -> decrypt -> decode -> check signature
//! ```
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use certseal::keys::KeyPair;
//! use certseal::protocol::{Issuer, Verifier};
//! use certseal::record::CertificateMetadata;
//! use certseal::ProtocolPolicy;
//! use std::sync::Arc;
//!
//! # fn example() -> certseal::Result<()> {
//! let policy = ProtocolPolicy::new();
//! let keys = Arc::new(KeyPair::generate(policy.rsa_key_bits)?);
//!
//! let issuer = Issuer::builder()
//!     .with_key_pair(keys.clone())
//!     .with_policy(Arc::new(policy.clone()))
//!     .build()?;
//!
//! let metadata = CertificateMetadata::new("CERT-2025-001", "HDD", "24 Sept 2025");
//! let issued = issuer.issue(metadata.to_record())?;
//!
//! // `issued.payload` goes into the QR code. On the other side:
//! let verifier = Verifier::new(keys.private_key().clone())?;
//! let signed = verifier.verify(&issued.payload)?;
//! assert_eq!(signed.record().get("Name"), Some("HDD"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Provisioning keys
//!
//! Keys are never generated implicitly. Call [`keys::ensure_keypair`] when a key
//! directory should be created or reused:
//!
//! ```rust,no_run
//! use certseal::keys::ensure_keypair;
//! use certseal::ProtocolPolicy;
//!
//! # fn example() -> certseal::Result<()> {
//! let keys = ensure_keypair("./keys", &ProtocolPolicy::new())?;
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod log;
pub mod policy;
pub mod protocol;
pub mod record;
pub mod signing;
pub mod wrap;

// Re-export key types
pub use crate::crypto::{CipherSuite, SymmetricSecret};
pub use crate::envelope::Envelope;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::keys::{KeyPair, PrivateKey, PublicKey};
pub use crate::log::{debug_enabled, set_logger, Logger};
pub use crate::policy::ProtocolPolicy;
pub use crate::protocol::{Issued, Issuer, Verifier};
pub use crate::record::{CertificateMetadata, MetadataRecord, SignedRecord};

/// Size of the AES-256 bulk key in bytes
pub const BULK_KEY_SIZE: usize = 32;

/// Size of the AES-CFB iv in bytes
pub const CFB_IV_SIZE: usize = 16;

/// Size of the AES-GCM nonce in bytes
pub const GCM_NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const GCM_TAG_SIZE: usize = 16;

use std::fmt;

/// Symmetric encryption of the serialized record under a one-time key and iv
pub trait SymmetricCipher: Send + Sync + fmt::Debug {
    /// The suite this cipher implements
    fn suite(&self) -> CipherSuite;

    /// Encrypts `plaintext` with the given key and iv
    fn encrypt(&self, plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts `ciphertext` with the given key and iv
    fn decrypt(&self, ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>>;
}
