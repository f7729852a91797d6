//! # Content Digests
//!
//! [`ContentDigest`] is the 128-bit MD5 of a document's full byte content.
//! It is both the deduplication key (at most one Document per digest) and
//! the object-store key, which keeps storage content-addressed: two uploads
//! with the same bytes always land on the same object regardless of filename.
//!
//! MD5 is used for addressing, not for integrity against an adversary.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// MD5 digest of a document's bytes.
///
/// Serializes as a 32-character lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    /// Compute the digest over the complete byte payload.
    pub fn of(data: &[u8]) -> Self {
        let hash = Md5::digest(data);
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Parse a 32-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.len() != 32 || !s.is_ascii() {
            return Err(ValidationError::InvalidDigest(s.to_string()));
        }
        let mut out = [0u8; 16];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ValidationError::InvalidDigest(s.to_string()))?;
        }
        Ok(Self(out))
    }

    /// Return the digest as a lowercase hex string.
    ///
    /// This string is also the object-store key for the document's bytes.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentDigest> for String {
    fn from(value: ContentDigest) -> Self {
        value.to_hex()
    }
}

/// Compute the MD5 [`ContentDigest`] of `data`.
pub fn md5_digest(data: &[u8]) -> ContentDigest {
    ContentDigest::of(data)
}
