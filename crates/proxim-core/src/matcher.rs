//! Exposure matching scan.
//!
//! Run once per participant per day, triggered on rollover: pull every key
//! record disclosed within the matching window, regenerate each key's full
//! day of identifiers, and test them against the participant's observation
//! ledger. Derivation is deterministic, so a match proves proximity to a
//! later-diagnosed participant during that key's day.

use chrono::{DateTime, Utc};
use proxim_crypto::{Enin, Rpi, derive_rpi};
use tracing::{debug, info};

use crate::{error::ProtocolError, ledger::ObservationLedger, service::DiagnosisService};

/// Identifier slots regenerated per disclosed key (one day of epochs).
pub const EPOCHS_PER_DAY: u32 = 96;

/// How far back disclosed keys are fetched, in days.
pub const HISTORICAL_RANGE_DAYS: u32 = 14;

/// A confirmed overlap between the ledger and a disclosed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureMatch {
    /// The matching identifier
    pub rpi: Rpi,
    /// Epoch at which the matching identifier was derived
    pub enin: Enin,
    /// Approximate exposure time: the matched key's origin epoch as a
    /// wall-clock instant (`origin * 600` seconds since epoch)
    pub observed_at: DateTime<Utc>,
}

/// Scan disclosed keys against an observation ledger.
///
/// For each fetched `(TEK, origin)` record the full day's identifier
/// sequence `derive_rpi(tek, origin + i)` for `i in 0..96` is tested for
/// ledger membership. The first match within a key ends that key's scan -
/// exposure is boolean, not a count - but remaining records are still
/// consumed so a poisoned stream element is never missed. Any element
/// carrying an error aborts the whole run with [`ProtocolError::Fetch`].
///
/// Returns the first match found, or `None` if the ledger never overlapped
/// a disclosed key's day.
pub fn scan<S: DiagnosisService + ?Sized>(
    service: &S,
    ledger: &ObservationLedger,
) -> Result<Option<ExposureMatch>, ProtocolError> {
    let mut first_match = None;
    let mut records = 0usize;

    for item in service.fetch_diagnosis_keys(HISTORICAL_RANGE_DAYS) {
        let record = item?;
        records += 1;

        for step in 0..EPOCHS_PER_DAY {
            let enin = record.origin.advanced(step);
            let rpi = derive_rpi(&record.tek, enin);
            if ledger.contains(&rpi) {
                info!(
                    origin = record.origin.index(),
                    matched = enin.index(),
                    "observed identifier matches disclosed key"
                );
                if first_match.is_none() {
                    first_match =
                        Some(ExposureMatch { rpi, enin, observed_at: record.origin.to_utc() });
                }
                break;
            }
        }
    }

    debug!(records, matched = first_match.is_some(), "exposure scan complete");
    Ok(first_match)
}
