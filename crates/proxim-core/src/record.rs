//! Boundary records exchanged with the diagnosis service.
//!
//! These are the only data shapes that cross the service seam: the published
//! `(TEK, origin epoch)` pair, the token request an authorized professional
//! issues on a participant's behalf, and the scoped credential that comes
//! back. Transport framing is out of scope; the types carry the logical
//! contract only.

use chrono::{DateTime, Utc};
use proxim_crypto::{Enin, Tek};
use serde::{Deserialize, Serialize};

/// ISO-8601 rendering used for token validity ranges at the service
/// boundary (`YYYY-MM-DDTHH:MM:SSZ`).
const RANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Category of keys a token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Keys disclosed after a confirmed diagnosis
    Diagnosed,
    /// Keys disclosed by the participant without professional confirmation
    SelfReported,
}

/// A TEK plus its origin epoch, as published to the diagnosis service.
///
/// Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// The disclosed daily secret
    pub tek: Tek,
    /// ENIN at TEK-creation time (the day-anchor)
    pub origin: Enin,
}

impl KeyRecord {
    /// Pair a TEK with its origin epoch.
    pub fn new(tek: Tek, origin: Enin) -> Self {
        Self { tek, origin }
    }
}

/// Request for an authorization token, made by an authorized professional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Professional's API key (secret, never the participant's)
    pub api_key: Vec<u8>,
    /// Start of the permitted disclosure range (inclusive)
    pub range_start: DateTime<Utc>,
    /// End of the permitted disclosure range (exclusive)
    pub range_end: DateTime<Utc>,
    /// Key category the token will authorize
    pub key_type: KeyType,
}

impl TokenRequest {
    /// Render the permitted range as ISO-8601 UTC strings, the form the
    /// service contract specifies.
    pub fn range_iso8601(&self) -> (String, String) {
        (
            self.range_start.format(RANGE_FORMAT).to_string(),
            self.range_end.format(RANGE_FORMAT).to_string(),
        )
    }
}

/// Opaque scoped credential permitting one report submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationToken {
    /// Opaque token bytes issued by the service
    pub token: Vec<u8>,
    /// Start of the validity window (inclusive)
    pub valid_from: DateTime<Utc>,
    /// End of the validity window (exclusive)
    pub valid_until: DateTime<Utc>,
    /// Key category this token authorizes
    pub key_type: KeyType,
}

impl AuthorizationToken {
    /// Whether `at` falls inside the validity window `[start, end)`.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at < self.valid_until
    }
}
