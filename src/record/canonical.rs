//! Canonical byte encoding of metadata records
//!
//! A record maps to exactly one byte sequence: a JSON object whose members appear in
//! insertion order, separated by `", "` and `": "`, with every character outside
//! printable ASCII written as a `\uXXXX` escape. The output is therefore plain ASCII
//! (and so UTF-8) and matches what Python's `json.dumps` emits for the same mapping.

use crate::error::{Error, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::Formatter;
use std::fmt;
use std::io;

/// JSON formatter producing the canonical separators and escaping
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Quotes, backslashes and C0 controls never reach here; serde_json escapes
        // those itself through write_char_escape.
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0_u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Borrowed view of the members that make up one canonical object
pub(crate) struct CanonicalFields<'a> {
    pub(crate) fields: &'a [(String, String)],
    pub(crate) trailer: Option<(&'a str, &'a str)>,
}

impl Serialize for CanonicalFields<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.fields.len() + usize::from(self.trailer.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some((key, value)) = self.trailer {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Serializes `value` with the canonical formatter
pub fn to_canonical_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::Encoding(format!("canonical serialization failed: {}", e)))?;
    Ok(out)
}

/// Ordered string members decoded from a canonical object
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderedFields(pub(crate) Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedFields {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = OrderedFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of string values")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields: Vec<(String, String)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    if fields.iter().any(|(existing, _)| *existing == key) {
                        return Err(de::Error::custom(format!("duplicate field `{}`", key)));
                    }
                    fields.push((key, value));
                }
                Ok(OrderedFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Parses canonical bytes back into ordered members.
///
/// Truncated input, trailing data, non-string values, duplicate keys and invalid
/// UTF-8 are all rejected.
pub(crate) fn decode_fields(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    serde_json::from_slice::<OrderedFields>(bytes)
        .map(|fields| fields.0)
        .map_err(|e| Error::Encoding(format!("malformed canonical encoding: {}", e)))
}
