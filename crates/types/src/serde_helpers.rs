//! `0x`-prefixed hex (de)serialization helpers for the JSON-RPC wire format.
//!
//! Mirrors the convention used throughout the Ethereum JSON-RPC ecosystem:
//! quantities are hex-encoded, minimal-width, `0x`-prefixed strings; byte
//! strings are hex-encoded with no leading zero stripping.

use serde::de::{Error as DeError, Unexpected};
use serde::{Deserialize, Deserializer, Serializer};

/// `0x`-hex <-> `u64` (accepts hex string or JSON number).
pub mod u64_hex {
    use super::*;

    pub fn serialize<S>(val: &u64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("0x{val:x}"))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Num {
            Str(String),
            Num(u64),
        }
        match Num::deserialize(d)? {
            Num::Num(n) => Ok(n),
            Num::Str(s) => {
                let stripped = s.strip_prefix("0x").unwrap_or(&s);
                u64::from_str_radix(stripped, 16)
                    .map_err(|_| D::Error::invalid_value(Unexpected::Str(&s), &"0x.. hex u64"))
            }
        }
    }
}

/// `0x`-hex <-> [`alloy_primitives::U256`] (string or number).
pub mod u256_hex {
    use super::*;
    use alloy_primitives::U256;

    pub fn serialize<S>(val: &U256, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("0x{val:x}"))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Num {
            Str(String),
            Num(u64),
        }
        match Num::deserialize(d)? {
            Num::Num(n) => Ok(U256::from(n)),
            Num::Str(s) => {
                let stripped = s.strip_prefix("0x").unwrap_or(&s);
                U256::from_str_radix(stripped, 16).map_err(D::Error::custom)
            }
        }
    }
}

/// `0x`-hex <-> `Vec<u8>` (accepts `""` or `"0x"` as empty).
pub mod bytes_hex {
    use super::*;

    pub fn serialize<S>(val: &[u8], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if val.is_empty() {
            return s.serialize_str("0x");
        }
        s.serialize_str(&format!("0x{}", hex::encode(val)))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(d)?;
        if s.is_empty() || s == "0x" {
            return Ok(vec![]);
        }
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(stripped).map_err(D::Error::custom)
    }
}

/// `0x`-hex <-> `Option<Vec<u8>>`, used for optional byte fields that should
/// serialize as `null` rather than `"0x"` when absent.
pub mod opt_bytes_hex {
    use super::*;

    pub fn serialize<S>(val: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match val {
            Some(bytes) => super::bytes_hex::serialize(bytes, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Deserialize::deserialize(d)?;
        match opt {
            None => Ok(None),
            Some(s) if s.is_empty() || s == "0x" => Ok(Some(vec![])),
            Some(s) => {
                let stripped = s.strip_prefix("0x").unwrap_or(&s);
                hex::decode(stripped).map(Some).map_err(D::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{bytes_hex, u256_hex, u64_hex};
    use alloy_primitives::U256;
    use serde::{Deserialize, Serialize};
    use serde_json as json;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct U64W(#[serde(with = "u64_hex")] u64);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct U256W(#[serde(with = "u256_hex")] U256);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct BytesW(#[serde(with = "bytes_hex")] Vec<u8>);

    #[test]
    fn u64_hex_deser_from_number() {
        let v: U64W = json::from_str("12345").unwrap();
        assert_eq!(v.0, 12345);
    }

    #[test]
    fn u64_hex_deser_from_hex_str() {
        let v: U64W = json::from_str(r#""0x3039""#).unwrap();
        assert_eq!(v.0, 12345);
    }

    #[test]
    fn u64_hex_serde_roundtrip() {
        let orig = U64W(0xdead_beef);
        let s = json::to_string(&orig).unwrap();
        assert_eq!(s, r#""0xdeadbeef""#);
        let back: U64W = json::from_str(&s).unwrap();
        assert_eq!(back, orig);
    }

    #[test]
    fn u64_hex_rejects_invalid() {
        let err = json::from_str::<U64W>(r#""not-hex""#).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn u256_hex_deser_from_number() {
        let w: U256W = json::from_str("42").unwrap();
        assert_eq!(w.0, U256::from(42u64));
    }

    #[test]
    fn u256_hex_roundtrip() {
        let big = U256::from(1u64) << 200;
        let w = U256W(big);
        let s = json::to_string(&w).unwrap();
        let back: U256W = json::from_str(&s).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn bytes_hex_deser_empty_variants() {
        let a: BytesW = json::from_str(r#""""#).unwrap();
        assert!(a.0.is_empty());
        let b: BytesW = json::from_str(r#""0x""#).unwrap();
        assert!(b.0.is_empty());
    }

    #[test]
    fn bytes_hex_roundtrip() {
        let w = BytesW(vec![0, 1, 2, 0xfe, 0xff]);
        let s = json::to_string(&w).unwrap();
        assert_eq!(s, r#""0x000102feff""#);
        let back: BytesW = json::from_str(&s).unwrap();
        assert_eq!(back, w);
    }
}
