//! Day-boundary key-rotation state machine.
//!
//! A participant holds exactly one active TEK at a time - the last one
//! appended - and appends a fresh one only when a tick crosses a UTC
//! calendar-day boundary. Ticks within the same day only move the last-seen
//! timestamp. The full TEK history is retained for historical matching and
//! eventual reporting.
//!
//! Entropy comes from the caller: the state machine never owns an RNG, so a
//! seeded generator gives fully reproducible rotations under test.

use chrono::{DateTime, Datelike, Utc};
use proxim_crypto::{Enin, TEK_LEN, Tek};
use rand::Rng;
use tracing::debug;

use crate::{error::ProtocolError, record::KeyRecord};

/// Outcome of feeding one tick to the rotation state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick stayed within the current calendar day; only last-seen moved.
    SameDay,
    /// Tick crossed a day boundary; a fresh TEK is now active.
    DayRollover {
        /// The key that just rotated out, paired with its origin epoch.
        /// This is the record a diagnosed participant may disclose - never
        /// a TEK still active.
        retired: KeyRecord,
    },
}

/// Per-participant rotation state: TEK history plus the last-seen tick.
#[derive(Debug, Clone)]
pub struct RotationState {
    /// One TEK per calendar day observed, append-only
    teks: Vec<Tek>,
    /// Origin epochs parallel to `teks`
    origins: Vec<Enin>,
    /// Timestamp of the most recent tick
    last_seen: DateTime<Utc>,
}

impl RotationState {
    /// Create rotation state at session start with one freshly generated TEK.
    pub fn new<R: Rng>(start: DateTime<Utc>, rng: &mut R) -> Self {
        let tek = generate_tek(rng);
        let origin = Enin::from_utc(start);
        Self { teks: vec![tek], origins: vec![origin], last_seen: start }
    }

    /// Feed one simulation tick.
    ///
    /// The tick timestamp must be strictly later than the previous one;
    /// anything else is a [`ProtocolError::ClockSkew`]. Crossing a UTC
    /// calendar-day boundary appends a fresh TEK anchored at the new tick's
    /// epoch and reports the retired key.
    pub fn tick<R: Rng>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<TickOutcome, ProtocolError> {
        if now <= self.last_seen {
            return Err(ProtocolError::ClockSkew { last_seen: self.last_seen, tick: now });
        }

        let rolled_over = !same_calendar_day(self.last_seen, now);
        self.last_seen = now;

        if !rolled_over {
            return Ok(TickOutcome::SameDay);
        }

        let retired = KeyRecord::new(self.active_tek().clone(), self.active_origin());

        let tek = generate_tek(rng);
        let origin = Enin::from_utc(now);
        self.teks.push(tek);
        self.origins.push(origin);

        debug!(day = %now.date_naive(), origin = origin.index(), "rotated to fresh daily key");

        Ok(TickOutcome::DayRollover { retired })
    }

    /// The currently active TEK (the last one appended).
    pub fn active_tek(&self) -> &Tek {
        // Invariant: constructed with one TEK, never emptied
        &self.teks[self.teks.len() - 1]
    }

    /// Origin epoch of the active TEK.
    pub fn active_origin(&self) -> Enin {
        self.origins[self.origins.len() - 1]
    }

    /// Number of daily keys held (equals distinct calendar days observed).
    pub fn key_count(&self) -> usize {
        self.teks.len()
    }

    /// Full key history in creation order.
    pub fn history(&self) -> impl Iterator<Item = (&Tek, Enin)> {
        self.teks.iter().zip(self.origins.iter().copied())
    }

    /// Timestamp of the most recent tick.
    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }
}

/// Whether two instants fall on the same UTC calendar day.
fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a.year(), a.ordinal()) == (b.year(), b.ordinal())
}

/// Draw 16 fresh key bytes from the caller's generator.
fn generate_tek<R: Rng>(rng: &mut R) -> Tek {
    let mut bytes = [0u8; TEK_LEN];
    rng.fill_bytes(&mut bytes);
    Tek::from_bytes(bytes)
}
