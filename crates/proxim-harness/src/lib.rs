//! Deterministic simulation harness for the Proxim protocol.
//!
//! Provides the in-memory diagnosis service and the session driver that
//! steps a population of participants through simulated days. Everything is
//! seeded and single-threaded: the same [`SessionConfig`] always produces
//! the same trace, which is what makes end-to-end exposure scenarios
//! assertable.
//!
//! The `proxim-sim` binary in this crate wraps a [`Session`] behind a small
//! CLI for ad-hoc runs.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod session;
pub mod sim_service;

pub use session::{Session, SessionConfig, SessionReport};
pub use sim_service::SimService;
