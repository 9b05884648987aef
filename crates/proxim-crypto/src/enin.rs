//! ENIN: the protocol's 10-minute epoch counter.
//!
//! Wall-clock time is quantized into 10-minute intervals counted from the
//! Unix epoch. The counter serves two roles: the time coordinate at which an
//! RPI is derived, and the day-anchor recorded alongside a TEK at creation
//! time (the "origin epoch").

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Seconds covered by one ENIN interval.
pub const EPOCH_SECONDS: u64 = 600;

/// 10-minute epoch counter since the Unix epoch.
///
/// Conversion is pure integer arithmetic with truncating division; there are
/// no error conditions. `Enin` is `Copy` and totally ordered, so it can be
/// used directly as a map key or loop bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Enin(u32);

impl Enin {
    /// Construct from a raw epoch index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Quantize Unix seconds into an epoch index (truncating division).
    pub fn from_unix_seconds(seconds: u64) -> Self {
        Self((seconds / EPOCH_SECONDS) as u32)
    }

    /// Quantize a UTC wall-clock instant into an epoch index.
    ///
    /// Instants before the Unix epoch clamp to epoch zero; the protocol has
    /// no meaningful time coordinate there.
    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Self::from_unix_seconds(at.timestamp().max(0) as u64)
    }

    /// Raw epoch index.
    pub fn index(self) -> u32 {
        self.0
    }

    /// Start of this epoch in Unix seconds (`index * 600`).
    pub fn unix_seconds(self) -> u64 {
        u64::from(self.0) * EPOCH_SECONDS
    }

    /// Start of this epoch as a UTC instant.
    pub fn to_utc(self) -> DateTime<Utc> {
        // unix_seconds fits comfortably in i64 for any u32 index
        Utc.timestamp_opt(self.unix_seconds() as i64, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Epoch index shifted forward by `steps` intervals.
    pub fn advanced(self, steps: u32) -> Self {
        Self(self.0 + steps)
    }

    /// Little-endian wire encoding used in the RPI padded block.
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_with_truncating_division() {
        assert_eq!(Enin::from_unix_seconds(0).index(), 0);
        assert_eq!(Enin::from_unix_seconds(599).index(), 0);
        assert_eq!(Enin::from_unix_seconds(600).index(), 1);
        assert_eq!(Enin::from_unix_seconds(1199).index(), 1);
        assert_eq!(Enin::from_unix_seconds(600_000).index(), 1000);
    }

    #[test]
    fn round_trips_through_unix_seconds() {
        for index in [0u32, 1, 96, 1000, 2_650_000] {
            let enin = Enin::new(index);
            assert_eq!(Enin::from_unix_seconds(enin.unix_seconds()), enin);
        }
    }

    #[test]
    fn round_trips_through_utc() {
        let enin = Enin::new(2_650_321);
        assert_eq!(Enin::from_utc(enin.to_utc()), enin);
    }

    #[test]
    fn pre_epoch_instants_clamp_to_zero() {
        let before = Utc.timestamp_opt(-1, 0).single().unwrap();
        assert_eq!(Enin::from_utc(before).index(), 0);
    }

    #[test]
    fn advanced_steps_forward() {
        let origin = Enin::new(1000);
        assert_eq!(origin.advanced(0), origin);
        assert_eq!(origin.advanced(95).index(), 1095);
    }

    #[test]
    fn little_endian_encoding() {
        assert_eq!(Enin::new(1000).to_le_bytes(), [0xe8, 0x03, 0x00, 0x00]);
    }
}
