use crate::cert::canonical::canonical_bytes;
use crate::cert::record::CertificateRecord;
use crate::utils::errors::{CertError, Result};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a certificate's canonical bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    /// Digest arbitrary bytes
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self { bytes }
    }

    /// Hash a record's current canonical fields
    pub fn of_record(record: &CertificateRecord) -> Result<Self> {
        Ok(Self::digest(&canonical_bytes(record)?))
    }

    /// Parse a 64-character hex digest
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CertError::Validation(format!("Invalid hash hex: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            CertError::Validation(format!("Hash must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lowercase hex, no prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Compare against a stored or caller-supplied hex string
    pub fn matches_hex(&self, other: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
