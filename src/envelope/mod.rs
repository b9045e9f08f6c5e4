//! The transport unit carried from issuer to verifier
//!
//! An [`Envelope`] holds the wrapped bulk key, the iv and the ciphertext of one
//! signed record. [`codec`] turns it into the single base64 token embedded in the QR
//! code and back.

pub mod codec;

use crate::crypto::CipherSuite;
use crate::error::Result;

/// Wrapped key, iv and ciphertext of a single sealed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Bulk key encrypted for the verifier
    pub wrapped_key: Vec<u8>,
    /// iv (CFB) or nonce (GCM) the record was encrypted under
    pub iv: Vec<u8>,
    /// Encrypted canonical bytes of the signed record
    pub ciphertext: Vec<u8>,
    /// Suite the ciphertext was produced with
    pub suite: CipherSuite,
}

impl Envelope {
    /// Creates a new Envelope
    pub fn new(wrapped_key: Vec<u8>, iv: Vec<u8>, ciphertext: Vec<u8>, suite: CipherSuite) -> Self {
        Envelope {
            wrapped_key,
            iv,
            ciphertext,
            suite,
        }
    }

    /// Encodes this envelope as a transport token
    pub fn assemble(&self) -> Result<String> {
        codec::encode(self)
    }

    /// Parses a transport token, failing with
    /// [`Error::MalformedPayload`](crate::Error::MalformedPayload)
    pub fn disassemble(token: &str) -> Result<Self> {
        codec::decode(token)
    }
}

/// Builds the transport token for a CFB-sealed record
pub fn assemble(wrapped_key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<String> {
    Envelope::new(
        wrapped_key.to_vec(),
        iv.to_vec(),
        ciphertext.to_vec(),
        CipherSuite::Aes256Cfb,
    )
    .assemble()
}

/// Splits a transport token into its wrapped key, iv and ciphertext
pub fn disassemble(token: &str) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let envelope = Envelope::disassemble(token)?;
    Ok((envelope.wrapped_key, envelope.iv, envelope.ciphertext))
}
