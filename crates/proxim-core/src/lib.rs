//! Proxim Protocol Core
//!
//! Identifier-rotation and exposure-matching engine for a decentralized
//! proximity-exposure protocol. Each participant rotates a private daily
//! secret (TEK), derives short-lived broadcast identifiers (RPIs) from it,
//! records identifiers overheard from peers, and - after a diagnosed
//! participant publishes its keys - replays the same derivation to learn
//! whether it was nearby.
//!
//! # Architecture
//!
//! ```text
//! RotationState ──(active TEK, tick epoch)──▶ derive_rpi ──▶ broadcast
//!       │                                                      │
//!       │ day rollover                           peers' ObservationLedger
//!       ▼                                                      │
//! DiagnosisFlow ──(retired KeyRecord)──▶ DiagnosisService ◀────┘
//!                                              │        matcher::scan
//!                                              ▼              │
//!                                   disclosed KeyRecords ─────▶ exposed?
//! ```
//!
//! The core is Sans-IO: randomness is supplied by the caller, wall-clock
//! timestamps arrive as tick arguments, and all service I/O goes through the
//! [`DiagnosisService`] trait. The `proxim-harness` crate provides the
//! deterministic in-memory service and the simulation driver.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod diagnosis;
pub mod error;
pub mod ledger;
pub mod matcher;
pub mod participant;
pub mod record;
pub mod rotation;
pub mod service;

pub use diagnosis::{DiagnosisFlow, DiagnosisPolicy};
pub use error::ProtocolError;
pub use ledger::ObservationLedger;
pub use matcher::{EPOCHS_PER_DAY, ExposureMatch, HISTORICAL_RANGE_DAYS};
pub use participant::{Participant, StepOutcome};
pub use record::{AuthorizationToken, KeyRecord, KeyType, TokenRequest};
pub use rotation::{RotationState, TickOutcome};
pub use service::{DiagnosisService, KeyStream};
