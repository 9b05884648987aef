//! End-to-end exposure scenario against the in-memory service.
//!
//! Participant A discloses a known key; participant B has overheard one of
//! A's identifiers and must come out of the matching scan exposed, with the
//! exposure time anchored at A's key origin.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proxim_core::{
    DiagnosisPolicy, DiagnosisService, KeyRecord, KeyType, Participant, ProtocolError,
    TokenRequest,
};
use proxim_crypto::{Enin, Rpi, Tek, derive_rpi};
use proxim_harness::SimService;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Pinned `derive_rpi([0u8; 16], 1000)` fixture.
const GOLDEN_RPI_HEX: &str = "a8aa0a8bbd5546efb30aeca84261d47c";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 5, 2, 0, 0, 0).unwrap()
}

fn golden_rpi() -> Rpi {
    let bytes: [u8; 16] = hex::decode(GOLDEN_RPI_HEX).unwrap().try_into().unwrap();
    Rpi::from_bytes(bytes)
}

/// Disclose A's `(zero TEK, enin 1000)` record through the real token flow.
fn disclose_known_key(service: &SimService) {
    let token = service
        .request_authorization(&TokenRequest {
            api_key: b"professional".to_vec(),
            range_start: now(),
            range_end: now() + Duration::days(14),
            key_type: KeyType::Diagnosed,
        })
        .unwrap();

    let record = KeyRecord::new(Tek::from_bytes([0u8; 16]), Enin::new(1000));
    service.submit_report(&token, &[record]).unwrap();
}

#[test]
fn derivation_matches_the_pinned_fixture() {
    let rpi = derive_rpi(&Tek::from_bytes([0u8; 16]), Enin::new(1000));
    assert_eq!(rpi, golden_rpi());
}

#[test]
fn observer_of_a_disclosed_identifier_is_marked_exposed() {
    let service = SimService::new(b"professional".to_vec(), now());
    disclose_known_key(&service);

    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let mut b = Participant::new("entity-b", now(), DiagnosisPolicy::default(), &mut rng);
    b.observe(golden_rpi());

    b.run_exposure_scan(&service).unwrap();

    assert!(b.exposed());
    let exposure = b.exposure().unwrap();
    assert_eq!(exposure.rpi, golden_rpi());
    assert_eq!(exposure.enin, Enin::new(1000));
    assert_eq!(exposure.observed_at.timestamp(), 600_000);
}

#[test]
fn non_observer_stays_unexposed() {
    let service = SimService::new(b"professional".to_vec(), now());
    disclose_known_key(&service);

    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let mut c = Participant::new("entity-c", now(), DiagnosisPolicy::default(), &mut rng);
    // C overheard plenty, none of it derived from the disclosed key
    for byte in 0..200u8 {
        c.observe(Rpi::from_bytes([byte; 16]));
    }

    c.run_exposure_scan(&service).unwrap();

    assert!(!c.exposed());
}

#[test]
fn poisoned_fetch_aborts_and_leaves_exposure_unchanged() {
    let service = SimService::new(b"professional".to_vec(), now());
    disclose_known_key(&service);

    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let mut b = Participant::new("entity-b", now(), DiagnosisPolicy::default(), &mut rng);
    b.observe(golden_rpi());

    // Prior value false: a failed scan must not flip it
    service.inject_fetch_fault("storage offline");
    let result = b.run_exposure_scan(&service);
    assert!(matches!(result, Err(ProtocolError::Fetch { .. })));
    assert!(!b.exposed());

    // Prior value true: a later failed scan must not clear it
    b.run_exposure_scan(&service).unwrap();
    assert!(b.exposed());

    service.inject_fetch_fault("storage offline again");
    let result = b.run_exposure_scan(&service);
    assert!(matches!(result, Err(ProtocolError::Fetch { .. })));
    assert!(b.exposed());
}
