//! Transport encoding of an [`Envelope`]
//!
//! The token is the standard base64 of a JSON object whose fields are, in order,
//! `key`, `iv` and `data`, each itself standard base64. Payloads sealed with an
//! authenticated suite add a trailing `alg` field.

use super::Envelope;
use crate::crypto::CipherSuite;
use crate::error::{Error, Result};
use crate::record::canonical::to_canonical_vec;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireEnvelope {
    #[serde(with = "b64")]
    key: Vec<u8>,
    #[serde(with = "b64")]
    iv: Vec<u8>,
    #[serde(with = "b64")]
    data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
}

mod b64 {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

fn malformed(reason: impl std::fmt::Display) -> Error {
    Error::MalformedPayload(reason.to_string())
}

/// Encodes `envelope` as a single QR-safe token
pub fn encode(envelope: &Envelope) -> Result<String> {
    let wire = WireEnvelope {
        key: envelope.wrapped_key.clone(),
        iv: envelope.iv.clone(),
        data: envelope.ciphertext.clone(),
        alg: match envelope.suite {
            CipherSuite::Aes256Cfb => None,
            suite => Some(suite.wire_alg().to_string()),
        },
    };

    let json = to_canonical_vec(&wire)?;
    Ok(STANDARD.encode(json))
}

/// Parses a token produced by [`encode`].
///
/// Surrounding whitespace is ignored. Every failure is reported as
/// [`Error::MalformedPayload`].
pub fn decode(token: &str) -> Result<Envelope> {
    let json = STANDARD
        .decode(token.trim())
        .map_err(|e| malformed(format!("payload is not valid base64: {}", e)))?;

    let wire: WireEnvelope = serde_json::from_slice(&json)
        .map_err(|e| malformed(format!("envelope does not parse: {}", e)))?;

    let suite = CipherSuite::from_wire_alg(wire.alg.as_deref())?;

    if wire.key.is_empty() {
        return Err(malformed("envelope `key` is empty"));
    }
    if wire.iv.len() != suite.iv_len() {
        return Err(malformed(format!(
            "envelope `iv` is {} bytes, {} needs {}",
            wire.iv.len(),
            suite,
            suite.iv_len()
        )));
    }

    Ok(Envelope {
        wrapped_key: wire.key,
        iv: wire.iv,
        ciphertext: wire.data,
        suite,
    })
}
