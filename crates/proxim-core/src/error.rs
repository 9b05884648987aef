//! Error types for the Proxim protocol core.
//!
//! One taxonomy covers the whole per-participant surface: the three
//! diagnosis-service operations plus the caller-side clock invariant. All
//! four are unrecoverable where they occur - the core has no retry policy
//! and no partial-success semantics, so any of them aborts the enclosing
//! per-participant operation and surfaces to the driver.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during protocol operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Authorization token request rejected, expired, or out of range
    #[error("authorization rejected: {reason}")]
    Authorization {
        /// Service-reported reason
        reason: String,
    },

    /// Report upload rejected by the diagnosis service
    #[error("submission rejected: {reason}")]
    Submission {
        /// Service-reported reason
        reason: String,
    },

    /// Key retrieval failed mid-stream
    #[error("key fetch failed: {reason}")]
    Fetch {
        /// Service-reported reason
        reason: String,
    },

    /// Tick timestamp not strictly later than the last-seen timestamp
    #[error("clock skew: tick {tick} is not after last-seen {last_seen}")]
    ClockSkew {
        /// Timestamp of the participant's previous tick
        last_seen: DateTime<Utc>,
        /// Offending tick timestamp
        tick: DateTime<Utc>,
    },
}

impl ProtocolError {
    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Service-side failures (authorization, submission, fetch) are
    /// typically transient network conditions; a caller layering bounded
    /// retry with backoff may safely re-attempt them. Clock skew is a
    /// caller invariant violation and is never transient. The core itself
    /// applies no retry policy either way.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::ClockSkew { .. })
    }
}
