//! Per-participant aggregate.
//!
//! Wires the rotation state machine, observation ledger, diagnosis flow, and
//! exposure mark into one entity the simulation driver can step. The
//! participant itself performs no service I/O during [`Participant::step`];
//! rollover work (exposure scan, then diagnosis check and disclosure) is
//! sequenced by the driver from the returned outcome, so a slow or failed
//! external call never hides inside a tick.

use chrono::{DateTime, Utc};
use proxim_crypto::{Enin, Rpi, derive_rpi};
use rand::Rng;
use tracing::warn;

use crate::{
    diagnosis::{DiagnosisFlow, DiagnosisPolicy},
    error::ProtocolError,
    ledger::ObservationLedger,
    matcher::{self, ExposureMatch},
    record::KeyRecord,
    rotation::{RotationState, TickOutcome},
    service::DiagnosisService,
};

/// Result of stepping a participant one tick.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Identifier broadcast during this tick, derived from the active TEK
    /// at the tick's epoch
    pub rpi: Rpi,
    /// Present when this tick crossed a day boundary; carries the record
    /// eligible for disclosure. The driver should run the exposure scan and
    /// the daily diagnosis check before the next tick.
    pub rollover: Option<KeyRecord>,
}

/// One simulated participant.
#[derive(Debug, Clone)]
pub struct Participant {
    name: String,
    rotation: RotationState,
    ledger: ObservationLedger,
    diagnosis: DiagnosisFlow,
    exposure: Option<ExposureMatch>,
}

impl Participant {
    /// Create a participant at session start with one fresh TEK.
    pub fn new<R: Rng>(
        name: impl Into<String>,
        start: DateTime<Utc>,
        policy: DiagnosisPolicy,
        rng: &mut R,
    ) -> Self {
        Self {
            name: name.into(),
            rotation: RotationState::new(start, rng),
            ledger: ObservationLedger::new(),
            diagnosis: DiagnosisFlow::new(policy),
            exposure: None,
        }
    }

    /// Advance one tick: rotate on day boundaries and derive this tick's
    /// broadcast identifier from the active TEK.
    pub fn step<R: Rng>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<StepOutcome, ProtocolError> {
        let rollover = match self.rotation.tick(now, rng)? {
            TickOutcome::SameDay => None,
            TickOutcome::DayRollover { retired } => Some(retired),
        };

        let rpi = derive_rpi(self.rotation.active_tek(), Enin::from_utc(now));
        Ok(StepOutcome { rpi, rollover })
    }

    /// Record an identifier overheard from a peer.
    pub fn observe(&mut self, rpi: Rpi) {
        self.ledger.record(rpi);
    }

    /// Run the daily exposure scan against the diagnosis service.
    ///
    /// The first match ever found is kept; later scans do not overwrite the
    /// recorded exposure. A fetch failure aborts the scan and leaves the
    /// exposure mark exactly as it was.
    pub fn run_exposure_scan<S: DiagnosisService + ?Sized>(
        &mut self,
        service: &S,
    ) -> Result<(), ProtocolError> {
        let found = matcher::scan(service, &self.ledger)?;
        if let Some(found) = found {
            if self.exposure.is_none() {
                warn!(name = %self.name, at = %found.observed_at, "participant exposed");
                self.exposure = Some(found);
            }
        }
        Ok(())
    }

    /// Run the daily diagnosis check and, when it fires, disclose the
    /// retired key from this rollover.
    pub fn run_daily_diagnosis<S: DiagnosisService + ?Sized, R: Rng>(
        &mut self,
        service: &S,
        api_key: &[u8],
        now: DateTime<Utc>,
        retired: &KeyRecord,
        rng: &mut R,
    ) -> Result<(), ProtocolError> {
        if self.diagnosis.check(rng) {
            self.diagnosis.disclose(service, api_key, now, retired.clone())?;
        }
        Ok(())
    }

    /// Participant name (for logs and reports).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any exposure has been confirmed.
    pub fn exposed(&self) -> bool {
        self.exposure.is_some()
    }

    /// The recorded exposure, if any.
    pub fn exposure(&self) -> Option<&ExposureMatch> {
        self.exposure.as_ref()
    }

    /// Whether the participant has ever been tested.
    pub fn tested(&self) -> bool {
        self.diagnosis.tested()
    }

    /// Whether the participant has been diagnosed.
    pub fn diagnosed(&self) -> bool {
        self.diagnosis.diagnosed()
    }

    /// Whether the participant has submitted a report.
    pub fn reported(&self) -> bool {
        self.diagnosis.reported()
    }

    /// The observation ledger.
    pub fn ledger(&self) -> &ObservationLedger {
        &self.ledger
    }

    /// The rotation state.
    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn step_derives_identifier_from_active_key() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut participant =
            Participant::new("entity-0", start(), DiagnosisPolicy::default(), &mut rng);

        let now = start() + Duration::minutes(15);
        let outcome = participant.step(now, &mut rng).unwrap();

        let expected = derive_rpi(participant.rotation().active_tek(), Enin::from_utc(now));
        assert_eq!(outcome.rpi, expected);
        assert!(outcome.rollover.is_none());
    }

    #[test]
    fn rollover_surfaces_the_retired_record() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut participant =
            Participant::new("entity-0", start(), DiagnosisPolicy::default(), &mut rng);
        let first_tek = participant.rotation().active_tek().clone();

        let outcome = participant.step(start() + Duration::days(1), &mut rng).unwrap();
        let retired = outcome.rollover.unwrap();

        assert_eq!(retired.tek, first_tek);
        assert_ne!(participant.rotation().active_tek(), &retired.tek);
    }

    #[test]
    fn observations_land_in_the_ledger() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut participant =
            Participant::new("entity-0", start(), DiagnosisPolicy::default(), &mut rng);

        let rpi = Rpi::from_bytes([5; 16]);
        participant.observe(rpi);

        assert!(participant.ledger().contains(&rpi));
        assert_eq!(participant.ledger().len(), 1);
    }
}
