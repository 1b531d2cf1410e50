//! Key and signature string formats.
//!
//! | kind        | format                                               |
//! |-------------|------------------------------------------------------|
//! | public key  | `EOS` + base58(point33 ‖ ripemd160(point33)[..4])     |
//! | public key  | `PUB_K1_` + base58(point33 ‖ ripemd160(point33 ‖ "K1")[..4]) |
//! | signature   | `SIG_K1_` + base58(sig65 ‖ ripemd160(sig65 ‖ "K1")[..4]) |

use ripemd::{Digest, Ripemd160};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::blockchain::types::{ChainError, ChainResult};

/// Legacy public key prefix.
pub const LEGACY_PUBLIC_KEY_PREFIX: &str = "EOS";
const PUB_K1_PREFIX: &str = "PUB_K1_";
const SIG_K1_PREFIX: &str = "SIG_K1_";
const K1_SUFFIX: &[u8] = b"K1";

pub(crate) const COMPRESSED_POINT_LEN: usize = 33;
pub(crate) const COMPACT_SIGNATURE_LEN: usize = 65;

/// First four bytes of ripemd160 over `data ‖ suffix`.
pub(crate) fn ripemd_checksum(data: &[u8], suffix: &[u8]) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Base58-decode `encoded` and split off a four byte checksum.
pub(crate) fn decode_checked(encoded: &str, expected_len: usize) -> Option<(Vec<u8>, [u8; 4])> {
    let mut bytes = bs58::decode(encoded).into_vec().ok()?;
    if bytes.len() != expected_len + 4 {
        return None;
    }
    let tail = bytes.split_off(expected_len);
    Some((bytes, [tail[0], tail[1], tail[2], tail[3]]))
}

fn encode_with_checksum(data: &[u8], checksum: [u8; 4]) -> String {
    let mut buf = Vec::with_capacity(data.len() + 4);
    buf.extend_from_slice(data);
    buf.extend_from_slice(&checksum);
    bs58::encode(buf).into_string()
}

/// Compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; COMPRESSED_POINT_LEN]);

impl PublicKey {
    pub fn from_compressed(bytes: [u8; COMPRESSED_POINT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMPRESSED_POINT_LEN] {
        &self.0
    }

    /// `PUB_K1_` rendering.
    pub fn to_k1_string(&self) -> String {
        format!(
            "{}{}",
            PUB_K1_PREFIX,
            encode_with_checksum(&self.0, ripemd_checksum(&self.0, K1_SUFFIX))
        )
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            LEGACY_PUBLIC_KEY_PREFIX,
            encode_with_checksum(&self.0, ripemd_checksum(&self.0, &[]))
        )
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        let (body, suffix): (&str, &[u8]) = if let Some(rest) = s.strip_prefix(PUB_K1_PREFIX) {
            (rest, K1_SUFFIX)
        } else if let Some(rest) = s.strip_prefix(LEGACY_PUBLIC_KEY_PREFIX) {
            (rest, &[])
        } else {
            return Err(ChainError::InvalidPublicKey(format!("unknown prefix in '{}'", s)));
        };

        let (point, checksum) = decode_checked(body, COMPRESSED_POINT_LEN)
            .ok_or_else(|| ChainError::InvalidPublicKey(format!("malformed key '{}'", s)))?;
        if ripemd_checksum(&point, suffix) != checksum {
            return Err(ChainError::InvalidPublicKey(format!("checksum mismatch in '{}'", s)));
        }

        let mut bytes = [0u8; COMPRESSED_POINT_LEN];
        bytes.copy_from_slice(&point);
        Ok(Self(bytes))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Recoverable compact signature: `header ‖ r ‖ s`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; COMPACT_SIGNATURE_LEN]);

impl Signature {
    pub fn from_compact(bytes: [u8; COMPACT_SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMPACT_SIGNATURE_LEN] {
        &self.0
    }

    /// Canonical form required by the chain: neither `r` nor `s` may carry a
    /// high bit or a redundant leading zero.
    pub fn is_canonical(&self) -> bool {
        is_canonical(&self.0)
    }
}

pub(crate) fn is_canonical(c: &[u8; COMPACT_SIGNATURE_LEN]) -> bool {
    (c[1] & 0x80) == 0
        && !(c[1] == 0 && (c[2] & 0x80) == 0)
        && (c[33] & 0x80) == 0
        && !(c[33] == 0 && (c[34] & 0x80) == 0)
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            SIG_K1_PREFIX,
            encode_with_checksum(&self.0, ripemd_checksum(&self.0, K1_SUFFIX))
        )
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl FromStr for Signature {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        let body = s
            .strip_prefix(SIG_K1_PREFIX)
            .ok_or_else(|| ChainError::Signing(format!("unsupported signature '{}'", s)))?;
        let (sig, checksum) = decode_checked(body, COMPACT_SIGNATURE_LEN)
            .ok_or_else(|| ChainError::Signing(format!("malformed signature '{}'", s)))?;
        if ripemd_checksum(&sig, K1_SUFFIX) != checksum {
            return Err(ChainError::Signing(format!("checksum mismatch in '{}'", s)));
        }
        let mut bytes = [0u8; COMPACT_SIGNATURE_LEN];
        bytes.copy_from_slice(&sig);
        Ok(Self(bytes))
    }
}

impl Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
