//! Deterministic simulation session.
//!
//! Drives a population of participants through 15-minute ticks against the
//! in-memory diagnosis service. Each tick runs three strictly ordered
//! phases:
//!
//! 1. Step every participant (data-independent across participants).
//! 2. Rollover work for participants that crossed a day boundary: exposure
//!    scan against the previous day's observation window, then the daily
//!    diagnosis check and any disclosure.
//! 3. Exchange: a fixed fraction of this tick's identifiers, sampled from an
//!    immutable snapshot assembled in phase 1, is delivered to uniformly
//!    random recipients via explicit `observe()` calls.
//!
//! The assembly-before-distribution barrier means no participant ever reads
//! another's in-progress state; with a seeded RNG the whole run is
//! reproducible byte-for-byte.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proxim_core::{DiagnosisPolicy, Participant, ProtocolError};
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::sim_service::SimService;

/// Ticks per simulated day (24 hours of 15-minute steps).
const TICKS_PER_DAY: u32 = 96;

/// Minutes advanced per tick.
const TICK_MINUTES: i64 = 15;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of simulated participants
    pub entities: usize,
    /// Days to simulate
    pub days: u32,
    /// RNG seed; equal seeds give identical runs
    pub seed: u64,
    /// Fraction of each tick's identifiers delivered to random recipients
    pub exchange_fraction: f64,
    /// Diagnosis sampling policy applied to every participant
    pub policy: DiagnosisPolicy,
    /// Professional api key shared with the service
    pub api_key: Vec<u8>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entities: 10,
            days: 30,
            seed: 0,
            exchange_fraction: 0.5,
            policy: DiagnosisPolicy::default(),
            api_key: b"professional".to_vec(),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Participants ever tested
    pub tested: usize,
    /// Participants diagnosed
    pub diagnosed: usize,
    /// Participants with a confirmed exposure
    pub exposed: usize,
    /// Records disclosed to the service
    pub disclosures: usize,
    /// Total identifiers observed across all ledgers
    pub observations: usize,
}

/// Simulation world: participants, service, clock, and seeded RNG.
pub struct Session {
    config: SessionConfig,
    participants: Vec<Participant>,
    service: SimService,
    time: DateTime<Utc>,
    rng: ChaCha20Rng,
}

impl Session {
    /// Create a session with its population at the canonical start instant.
    pub fn new(config: SessionConfig) -> Self {
        // Session epoch mirrors the reference trace (May 1st 2020, UTC)
        let start = Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let mut rng = ChaCha20Rng::seed_from_u64(config.seed);

        let participants = (0..config.entities)
            .map(|i| Participant::new(format!("entity-{i}"), start, config.policy, &mut rng))
            .collect();

        let service = SimService::new(config.api_key.clone(), start);

        Self { config, participants, service, time: start, rng }
    }

    /// Advance one 15-minute tick.
    pub fn step(&mut self) -> Result<(), ProtocolError> {
        let new_time = self.time + Duration::minutes(TICK_MINUTES);
        self.service.set_now(new_time);

        // Phase 1: step all participants, assembling the exchange snapshot
        let mut tick_rpis = Vec::with_capacity(self.participants.len());
        let mut rollovers = Vec::new();
        for (index, participant) in self.participants.iter_mut().enumerate() {
            let outcome = participant.step(new_time, &mut self.rng)?;
            tick_rpis.push(outcome.rpi);
            if let Some(retired) = outcome.rollover {
                rollovers.push((index, retired));
            }
        }

        // Phase 2: rollover work - scan first (previous day's observation
        // window), then the daily diagnosis check
        if !rollovers.is_empty() {
            debug!(day = %new_time.date_naive(), rollovers = rollovers.len(), "day boundary");
        }
        for (index, retired) in rollovers {
            let participant = &mut self.participants[index];
            participant.run_exposure_scan(&self.service)?;
            participant.run_daily_diagnosis(
                &self.service,
                &self.config.api_key,
                new_time,
                &retired,
                &mut self.rng,
            )?;
        }

        // Phase 3: distribute a random sample of the snapshot
        let sample_size =
            (self.config.exchange_fraction * self.participants.len() as f64) as usize;
        let exchanged: Vec<_> =
            tick_rpis.choose_multiple(&mut self.rng, sample_size).copied().collect();
        for rpi in exchanged {
            let recipient = self.rng.gen_range(0..self.participants.len());
            self.participants[recipient].observe(rpi);
        }

        self.time = new_time;
        Ok(())
    }

    /// Run the configured number of days and summarize.
    pub fn run(&mut self) -> Result<SessionReport, ProtocolError> {
        let ticks = TICKS_PER_DAY * self.config.days;
        info!(
            entities = self.config.entities,
            days = self.config.days,
            seed = self.config.seed,
            "running simulation"
        );

        for _ in 0..ticks {
            self.step()?;
        }

        let report = self.report();
        info!(?report, "simulation complete");
        Ok(report)
    }

    /// Summarize the current state.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            tested: self.participants.iter().filter(|p| p.tested()).count(),
            diagnosed: self.participants.iter().filter(|p| p.diagnosed()).count(),
            exposed: self.participants.iter().filter(|p| p.exposed()).count(),
            disclosures: self.service.disclosure_count(),
            observations: self.participants.iter().map(|p| p.ledger().len()).sum(),
        }
    }

    /// Current simulation time.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The simulated participants.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The in-memory diagnosis service.
    pub fn service(&self) -> &SimService {
        &self.service
    }
}
