//! Diagnosis flow: testing, diagnosis, and key disclosure.
//!
//! Runs once per day-rollover per participant. The flow is split in two so
//! unit tests can exercise the sampling logic without a live service:
//! [`DiagnosisFlow::check`] is the pure per-day decision, and
//! [`DiagnosisFlow::disclose`] is the effectful token-plus-submission step.
//!
//! Disclosure happens at most once per participant: the flow submits only
//! after the diagnosed flag first becomes true, and the `reported` latch
//! stops repeated daily checks from resubmitting.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    error::ProtocolError,
    record::{KeyRecord, KeyType, TokenRequest},
    service::DiagnosisService,
};

/// Days of disclosure scope requested with an authorization token.
const DISCLOSURE_RANGE_DAYS: i64 = 14;

/// Sampling policy for the per-day diagnosis check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosisPolicy {
    /// Per-day probability of becoming tested
    pub test_probability: f64,
    /// Per-trial probability of a test coming back positive
    pub diagnosis_probability: f64,
    /// Whether a tested-but-undiagnosed participant keeps testing daily.
    /// `false` grants a single lifetime diagnosis trial instead.
    pub retest_daily: bool,
}

impl Default for DiagnosisPolicy {
    fn default() -> Self {
        Self { test_probability: 0.10, diagnosis_probability: 0.25, retest_daily: true }
    }
}

/// Per-participant diagnosis state machine.
#[derive(Debug, Clone)]
pub struct DiagnosisFlow {
    policy: DiagnosisPolicy,
    tested: bool,
    diagnosed: bool,
    reported: bool,
    trials: u32,
}

impl DiagnosisFlow {
    /// Create an undiagnosed flow with the given policy.
    pub fn new(policy: DiagnosisPolicy) -> Self {
        Self { policy, tested: false, diagnosed: false, reported: false, trials: 0 }
    }

    /// Run the pure per-day decision.
    ///
    /// Samples the testing and diagnosis coins against the policy, latching
    /// `tested` and `diagnosed` once they flip. Returns true when the caller
    /// should attempt disclosure now: newly-or-previously diagnosed and not
    /// yet reported.
    pub fn check<R: Rng>(&mut self, rng: &mut R) -> bool {
        if !self.tested && rng.r#gen::<f64>() < self.policy.test_probability {
            self.tested = true;
            debug!("participant entered testing");
        }

        if self.tested && !self.diagnosed && (self.trials == 0 || self.policy.retest_daily) {
            self.trials += 1;
            if rng.r#gen::<f64>() < self.policy.diagnosis_probability {
                self.diagnosed = true;
                info!("participant diagnosed");
            }
        }

        self.diagnosed && !self.reported
    }

    /// Disclose one key record to the diagnosis service.
    ///
    /// Requests an authorization token scoped `[now, now + 14 days)` for
    /// diagnosed keys, then submits the record presenting that token. Either
    /// service error is fatal to the flow: it propagates unchanged and
    /// nothing is retried. On success the flow latches `reported`.
    ///
    /// The record must be the participant's most recently rotated-out TEK -
    /// never one still active.
    pub fn disclose<S: DiagnosisService + ?Sized>(
        &mut self,
        service: &S,
        api_key: &[u8],
        now: DateTime<Utc>,
        record: KeyRecord,
    ) -> Result<(), ProtocolError> {
        let request = TokenRequest {
            api_key: api_key.to_vec(),
            range_start: now,
            range_end: now + Duration::days(DISCLOSURE_RANGE_DAYS),
            key_type: KeyType::Diagnosed,
        };

        let token = service.request_authorization(&request)?;
        service.submit_report(&token, std::slice::from_ref(&record))?;

        self.reported = true;
        info!(origin = record.origin.index(), "disclosed daily key");
        Ok(())
    }

    /// Whether the participant has ever been tested.
    pub fn tested(&self) -> bool {
        self.tested
    }

    /// Whether the participant has been diagnosed.
    pub fn diagnosed(&self) -> bool {
        self.diagnosed
    }

    /// Whether a report has been submitted.
    pub fn reported(&self) -> bool {
        self.reported
    }
}
