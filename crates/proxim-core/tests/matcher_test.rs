//! Exposure-matching soundness, completeness, and failure behavior.

use chrono::{TimeZone, Utc};
use proxim_core::{
    AuthorizationToken, DiagnosisService, EPOCHS_PER_DAY, KeyRecord, KeyStream,
    ObservationLedger, ProtocolError, TokenRequest, matcher,
};
use proxim_crypto::{Enin, Tek, derive_rpi};

/// Fixed-response service: yields a canned key stream, accepts everything
/// else.
struct StubService {
    stream: Vec<Result<KeyRecord, ProtocolError>>,
}

impl StubService {
    fn with_records(records: Vec<KeyRecord>) -> Self {
        Self { stream: records.into_iter().map(Ok).collect() }
    }
}

impl DiagnosisService for StubService {
    fn request_authorization(
        &self,
        request: &TokenRequest,
    ) -> Result<AuthorizationToken, ProtocolError> {
        Ok(AuthorizationToken {
            token: vec![0xAA],
            valid_from: request.range_start,
            valid_until: request.range_end,
            key_type: request.key_type,
        })
    }

    fn submit_report(
        &self,
        _token: &AuthorizationToken,
        _records: &[KeyRecord],
    ) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn fetch_diagnosis_keys(&self, _historical_days: u32) -> KeyStream<'_> {
        Box::new(self.stream.clone().into_iter())
    }
}

fn disclosed_key() -> (Tek, Enin) {
    (Tek::from_bytes([0u8; 16]), Enin::new(1000))
}

#[test]
fn no_overlap_means_no_exposure() {
    let (tek, origin) = disclosed_key();
    let service = StubService::with_records(vec![KeyRecord::new(tek, origin)]);

    // Ledger full of observations that never came from the disclosed key
    let mut ledger = ObservationLedger::new();
    let other = Tek::from_bytes([0xFF; 16]);
    for step in 0..EPOCHS_PER_DAY {
        ledger.record(derive_rpi(&other, origin.advanced(step)));
    }

    let result = matcher::scan(&service, &ledger).unwrap();
    assert!(result.is_none(), "unrelated observations must not match");
}

#[test]
fn overlap_anywhere_in_the_day_matches() {
    let (tek, origin) = disclosed_key();

    for step in [0u32, 1, 47, EPOCHS_PER_DAY - 1] {
        let service =
            StubService::with_records(vec![KeyRecord::new(tek.clone(), origin)]);

        let mut ledger = ObservationLedger::new();
        ledger.record(derive_rpi(&tek, origin.advanced(step)));

        let found = matcher::scan(&service, &ledger).unwrap();
        let found = found.unwrap_or_else(|| unreachable!("epoch offset {step} must match"));
        assert_eq!(found.enin, origin.advanced(step));
    }
}

#[test]
fn epoch_past_the_day_window_does_not_match() {
    let (tek, origin) = disclosed_key();
    let service = StubService::with_records(vec![KeyRecord::new(tek.clone(), origin)]);

    let mut ledger = ObservationLedger::new();
    ledger.record(derive_rpi(&tek, origin.advanced(EPOCHS_PER_DAY)));

    let result = matcher::scan(&service, &ledger).unwrap();
    assert!(result.is_none(), "epoch one past the window must not match");
}

#[test]
fn exposure_time_comes_from_the_key_origin() {
    let (tek, origin) = disclosed_key();
    let service = StubService::with_records(vec![KeyRecord::new(tek.clone(), origin)]);

    let mut ledger = ObservationLedger::new();
    ledger.record(derive_rpi(&tek, origin.advanced(12)));

    let found = matcher::scan(&service, &ledger).unwrap().unwrap();
    assert_eq!(found.observed_at.timestamp(), 600_000);
    assert_eq!(found.observed_at, Utc.timestamp_opt(600_000, 0).single().unwrap());
}

#[test]
fn first_match_wins_across_keys() {
    let origin_a = Enin::new(1000);
    let origin_b = Enin::new(2000);
    let tek_a = Tek::from_bytes([1; 16]);
    let tek_b = Tek::from_bytes([2; 16]);

    let service = StubService::with_records(vec![
        KeyRecord::new(tek_a.clone(), origin_a),
        KeyRecord::new(tek_b.clone(), origin_b),
    ]);

    let mut ledger = ObservationLedger::new();
    ledger.record(derive_rpi(&tek_a, origin_a.advanced(3)));
    ledger.record(derive_rpi(&tek_b, origin_b.advanced(3)));

    let found = matcher::scan(&service, &ledger).unwrap().unwrap();
    assert_eq!(found.enin, origin_a.advanced(3), "earlier stream record wins");
}

#[test]
fn poisoned_stream_element_aborts_the_run() {
    let (tek, origin) = disclosed_key();
    let service = StubService {
        stream: vec![Err(ProtocolError::Fetch { reason: "storage offline".into() })],
    };

    let mut ledger = ObservationLedger::new();
    ledger.record(derive_rpi(&tek, origin));

    let result = matcher::scan(&service, &ledger);
    assert!(matches!(result, Err(ProtocolError::Fetch { .. })));
}

#[test]
fn error_after_a_match_still_aborts() {
    let (tek, origin) = disclosed_key();
    let service = StubService {
        stream: vec![
            Ok(KeyRecord::new(tek.clone(), origin)),
            Err(ProtocolError::Fetch { reason: "stream truncated".into() }),
        ],
    };

    let mut ledger = ObservationLedger::new();
    ledger.record(derive_rpi(&tek, origin));

    // The whole run is fatal even though the first record matched
    let result = matcher::scan(&service, &ledger);
    assert!(matches!(result, Err(ProtocolError::Fetch { .. })));
}
