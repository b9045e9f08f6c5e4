//! Metadata records and their canonical encoding
//!
//! A [`MetadataRecord`] is an ordered list of string fields built by the issuer. Once
//! signed it becomes a [`SignedRecord`], whose canonical bytes carry the record's
//! fields followed by the reserved `signature` field.

pub mod canonical;
pub mod certificate;

pub use certificate::CertificateMetadata;

use crate::error::{Error, Result};
use canonical::{decode_fields, to_canonical_vec, CanonicalFields};

/// Field name reserved for the issuer's signature
pub const SIGNATURE_FIELD: &str = "signature";

/// Ordered mapping of field name to string value.
///
/// Fields keep their insertion order; that order is part of the canonical encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: Vec<(String, String)>,
}

impl MetadataRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    ///
    /// A new key is appended; an existing key keeps its position and takes the new
    /// value. The reserved `signature` key is refused.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if key == SIGNATURE_FIELD {
            return Err(Error::Encoding(format!(
                "field `{}` is reserved for the issuer signature",
                SIGNATURE_FIELD
            )));
        }
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Returns the value of `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// True when the record holds `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical bytes of this record. These are the bytes that get signed.
    pub fn encode(&self) -> Result<Vec<u8>> {
        to_canonical_vec(&CanonicalFields {
            fields: &self.fields,
            trailer: None,
        })
    }

    /// Exact inverse of [`encode`](Self::encode).
    ///
    /// Fails with [`Error::Encoding`] on malformed input or if the bytes carry a
    /// `signature` field; signed bytes go through [`SignedRecord::decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let fields = decode_fields(bytes)?;
        if fields.iter().any(|(key, _)| key == SIGNATURE_FIELD) {
            return Err(Error::Encoding(
                "unsigned record must not carry a signature field".into(),
            ));
        }
        Ok(Self { fields })
    }
}

impl<K, V> FromIterator<(K, V)> for MetadataRecord
where
    K: Into<String>,
    V: Into<String>,
{
    /// Collects fields in iteration order. A reserved `signature` entry is dropped.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            // Only the reserved key can fail
            let _ = record.insert(key, value);
        }
        record
    }
}

/// A record together with the base64 signature over its canonical bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRecord {
    record: MetadataRecord,
    signature: String,
}

impl SignedRecord {
    /// Pairs a record with its base64 signature
    pub fn new(record: MetadataRecord, signature: impl Into<String>) -> Self {
        Self {
            record,
            signature: signature.into(),
        }
    }

    /// The signed fields, without the signature
    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    /// The base64 signature
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Splits into record and signature
    pub fn into_parts(self) -> (MetadataRecord, String) {
        (self.record, self.signature)
    }

    /// Canonical bytes of the record followed by the `signature` field.
    /// These are the bytes that get encrypted.
    pub fn encode(&self) -> Result<Vec<u8>> {
        to_canonical_vec(&CanonicalFields {
            fields: &self.record.fields,
            trailer: Some((SIGNATURE_FIELD, &self.signature)),
        })
    }

    /// Decodes signed bytes into the record and its signature, if any.
    ///
    /// The signature field is lifted out wherever it appears; the remaining fields
    /// keep their order, so re-encoding the record reproduces the signed bytes.
    pub fn decode(bytes: &[u8]) -> Result<(MetadataRecord, Option<String>)> {
        let mut fields = decode_fields(bytes)?;
        let signature = fields
            .iter()
            .position(|(key, _)| key == SIGNATURE_FIELD)
            .map(|index| fields.remove(index).1);
        Ok((MetadataRecord { fields }, signature))
    }
}
