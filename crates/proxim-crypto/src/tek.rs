//! Temporary exposure keys (TEKs).
//!
//! A TEK is the daily rotating secret: 16 random bytes generated once per
//! calendar day per participant and immutable after creation. It stays
//! private until the participant is diagnosed and publishes it, so the type
//! zeroizes on drop and redacts its Debug output.
//!
//! The crate never draws randomness itself; callers pass in the generated
//! bytes, which keeps derivation code deterministic under test.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

/// TEK length in bytes.
pub const TEK_LEN: usize = 16;

/// Errors from TEK construction.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Key material had the wrong length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length
        expected: usize,
        /// Actual key length
        actual: usize,
    },
}

/// Temporary exposure key: a participant's daily 16-byte secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tek([u8; TEK_LEN]);

impl Tek {
    /// Wrap caller-generated key material.
    pub fn from_bytes(bytes: [u8; TEK_LEN]) -> Self {
        Self(bytes)
    }

    /// Wrap a byte slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let material: [u8; TEK_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidKeyLength { expected: TEK_LEN, actual: bytes.len() })?;
        Ok(Self(material))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; TEK_LEN] {
        &self.0
    }
}

// Zeroize key material; a TEK is secret until deliberately published.
impl Drop for Tek {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Redacted: key bytes never reach logs.
impl std::fmt::Debug for Tek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Tek(..)")
    }
}
