//! Hex encoding helpers for fixed-size byte types
//!
//! Key material and signatures cross the wire as lowercase hex strings so
//! that golden vectors stay readable and diffable. The serde adapters here
//! are shared by every byte-array wrapper in this crate.

use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

/// Serde adapter serializing a fixed-size byte array as a hex string.
pub mod hex_array {
    use super::*;

    /// Serialize the array as lowercase hex.
    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Deserialize a hex string into a fixed-size array.
    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        bytes.try_into().map_err(|decoded: Vec<u8>| {
            serde::de::Error::custom(format!(
                "expected {N} bytes of hex, got {}",
                decoded.len()
            ))
        })
    }
}

/// Render a short hex prefix of a byte slice, for `Display`/`Debug` output.
pub fn short_hex(bytes: &[u8]) -> impl fmt::Display {
    hex::encode(&bytes[..bytes.len().min(4)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "hex_array")] [u8; 8]);

    #[test]
    fn test_hex_array_roundtrip() {
        let value = Wrapper([0xAB; 8]);
        let json = serde_json::to_string(&value).expect("serialize");
        assert_eq!(json, "\"abababababababab\"");

        let restored: Wrapper = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, value);
    }

    #[test]
    fn test_hex_array_rejects_wrong_length() {
        let result: Result<Wrapper, _> = serde_json::from_str("\"abab\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_short_hex() {
        let bytes = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11];
        assert_eq!(short_hex(&bytes).to_string(), "deadbeef");
    }
}
