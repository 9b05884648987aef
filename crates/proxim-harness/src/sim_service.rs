//! In-memory diagnosis service for deterministic simulation.
//!
//! Implements the full logical contract of the external key-management
//! service: an api-key gate on token issuance, single-use tokens with
//! validity windows, per-record disclosure timestamps, and a historical-range
//! filter on fetch. Tokens are numbered deterministically so runs with the
//! same seed produce identical traces.
//!
//! Fault injection is one-shot per operation: arm a fault and the next call
//! to that operation fails exactly once, which is how tests exercise the
//! fatal-on-error paths without a flaky network.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use proxim_core::{
    AuthorizationToken, DiagnosisService, KeyRecord, KeyStream, ProtocolError, TokenRequest,
};

/// A token the service has issued and may still accept once.
struct IssuedToken {
    token: AuthorizationToken,
    consumed: bool,
}

/// One disclosed record with its service-side disclosure timestamp.
struct Disclosure {
    record: KeyRecord,
    disclosed_at: DateTime<Utc>,
}

struct SimServiceInner {
    /// The professional api key accepted for token issuance
    api_key: Vec<u8>,
    /// Service-side notion of "now", advanced by the session driver
    now: DateTime<Utc>,
    /// Deterministic token counter
    next_token: u64,
    /// Issued tokens keyed by their opaque bytes
    issued: HashMap<Vec<u8>, IssuedToken>,
    /// All disclosures in submission order
    disclosed: Vec<Disclosure>,
    /// One-shot faults, consumed by the next matching call
    authorization_fault: Option<String>,
    submission_fault: Option<String>,
    fetch_fault: Option<String>,
}

/// In-memory [`DiagnosisService`] implementation for testing and simulation.
///
/// All state is wrapped in `Arc<Mutex<>>` to allow Clone and shared access
/// from the session driver. Uses `lock().expect()` which will panic if the
/// mutex is poisoned - acceptable for test/simulation code.
#[derive(Clone)]
pub struct SimService {
    inner: Arc<Mutex<SimServiceInner>>,
}

impl SimService {
    /// Create a service accepting `api_key`, with its clock at `now`.
    pub fn new(api_key: impl Into<Vec<u8>>, now: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimServiceInner {
                api_key: api_key.into(),
                now,
                next_token: 0,
                issued: HashMap::new(),
                disclosed: Vec::new(),
                authorization_fault: None,
                submission_fault: None,
                fetch_fault: None,
            })),
        }
    }

    /// Advance the service clock. The session driver calls this each tick so
    /// the historical-range filter tracks simulation time.
    pub fn set_now(&self, now: DateTime<Utc>) {
        self.locked().now = now;
    }

    /// Number of records disclosed so far.
    pub fn disclosure_count(&self) -> usize {
        self.locked().disclosed.len()
    }

    /// Snapshot of every disclosed record in submission order.
    pub fn disclosed_records(&self) -> Vec<KeyRecord> {
        self.locked().disclosed.iter().map(|d| d.record.clone()).collect()
    }

    /// Fail the next token request with the given reason.
    pub fn inject_authorization_fault(&self, reason: impl Into<String>) {
        self.locked().authorization_fault = Some(reason.into());
    }

    /// Fail the next submission with the given reason.
    pub fn inject_submission_fault(&self, reason: impl Into<String>) {
        self.locked().submission_fault = Some(reason.into());
    }

    /// Poison the next fetch stream with the given reason.
    pub fn inject_fetch_fault(&self, reason: impl Into<String>) {
        self.locked().fetch_fault = Some(reason.into());
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (a thread panicked while
    /// holding the lock). This is acceptable for test/simulation code.
    #[allow(clippy::expect_used)]
    fn locked(&self) -> MutexGuard<'_, SimServiceInner> {
        self.inner.lock().expect("Mutex poisoned")
    }
}

impl DiagnosisService for SimService {
    fn request_authorization(
        &self,
        request: &TokenRequest,
    ) -> Result<AuthorizationToken, ProtocolError> {
        let mut inner = self.locked();

        if let Some(reason) = inner.authorization_fault.take() {
            return Err(ProtocolError::Authorization { reason });
        }

        if request.api_key != inner.api_key {
            return Err(ProtocolError::Authorization { reason: "unknown api key".into() });
        }

        if request.range_start >= request.range_end {
            return Err(ProtocolError::Authorization { reason: "empty permitted range".into() });
        }

        let bytes = inner.next_token.to_be_bytes().to_vec();
        inner.next_token += 1;

        let token = AuthorizationToken {
            token: bytes.clone(),
            valid_from: request.range_start,
            valid_until: request.range_end,
            key_type: request.key_type,
        };
        inner.issued.insert(bytes, IssuedToken { token: token.clone(), consumed: false });

        Ok(token)
    }

    fn submit_report(
        &self,
        token: &AuthorizationToken,
        records: &[KeyRecord],
    ) -> Result<(), ProtocolError> {
        let mut inner = self.locked();

        if let Some(reason) = inner.submission_fault.take() {
            return Err(ProtocolError::Submission { reason });
        }

        if records.is_empty() {
            return Err(ProtocolError::Submission { reason: "empty report".into() });
        }

        let now = inner.now;
        let Some(issued) = inner.issued.get_mut(&token.token) else {
            return Err(ProtocolError::Submission { reason: "unknown token".into() });
        };

        if issued.consumed {
            return Err(ProtocolError::Submission { reason: "token already used".into() });
        }

        if issued.token.key_type != token.key_type {
            return Err(ProtocolError::Submission { reason: "key type mismatch".into() });
        }

        if !issued.token.covers(now) {
            return Err(ProtocolError::Submission { reason: "token outside validity".into() });
        }

        issued.consumed = true;

        for record in records {
            inner.disclosed.push(Disclosure { record: record.clone(), disclosed_at: now });
        }

        Ok(())
    }

    fn fetch_diagnosis_keys(&self, historical_days: u32) -> KeyStream<'_> {
        let mut inner = self.locked();

        let cutoff = inner.now - Duration::days(i64::from(historical_days));
        let mut stream: Vec<Result<KeyRecord, ProtocolError>> = inner
            .disclosed
            .iter()
            .filter(|d| d.disclosed_at >= cutoff)
            .map(|d| Ok(d.record.clone()))
            .collect();

        if let Some(reason) = inner.fetch_fault.take() {
            stream.push(Err(ProtocolError::Fetch { reason }));
        }

        Box::new(stream.into_iter())
    }
}
