// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hex boundary between wire strings and byte payloads.
//!
//! Binary fields (schema hashes, consensus topics, signatures, blobs) are
//! lowercase hex strings on the wire. The serde helpers here let structs
//! declare `#[serde(with = "zap_core::hexstr")]` on their byte fields; an
//! empty string maps to an empty byte vector in both directions.

use serde::{Deserialize, Deserializer, Serializer};

/// Encode bytes as a lowercase hex string.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string into bytes. An empty string yields an empty vector.
///
/// # Errors
///
/// Returns the underlying [`hex::FromHexError`] for odd-length or
/// non-hex input.
pub fn from_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(s)
}

/// Serde serializer for `#[serde(with = "hexstr")]`.
pub fn serialize<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex(bytes))
}

/// Serde deserializer for `#[serde(with = "hexstr")]`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    from_hex(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(to_hex(&bytes), "deadbeef");
        assert_eq!(from_hex("deadbeef").unwrap(), bytes);
    }

    #[test]
    fn empty_string_is_empty_bytes() {
        assert_eq!(from_hex("").unwrap(), Vec::<u8>::new());
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn rejects_non_hex() {
        assert!(from_hex("zz").is_err());
        assert!(from_hex("abc").is_err());
    }

    #[test]
    fn serde_field_round_trips() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Blob {
            #[serde(with = "super")]
            data: Vec<u8>,
        }

        let json = serde_json::to_string(&Blob {
            data: vec![1, 2, 255],
        })
        .unwrap();
        assert_eq!(json, r#"{"data":"0102ff"}"#);
        let back: Blob = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, vec![1, 2, 255]);
    }
}
