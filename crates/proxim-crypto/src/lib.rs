//! Proxim Cryptographic Primitives
//!
//! Identifier-derivation building blocks for the Proxim proximity-exposure
//! protocol. Pure functions with deterministic outputs. Callers provide
//! random bytes for deterministic testing.
//!
//! # Identifier Lifecycle
//!
//! Each participant holds one temporary exposure key (TEK) per calendar day.
//! For every 10-minute epoch (ENIN) a rolling proximity identifier (RPI) is
//! derived from the active TEK and broadcast to nearby participants. A
//! diagnosed participant later publishes its TEK, letting everyone replay the
//! same derivation and test their own observations for matches.
//!
//! ```text
//! TEK (daily secret, 16 bytes)
//!        │
//!        ▼
//! HKDF-SHA256 ("EN-RPIK") → RPIK (per-TEK sub-key)
//!        │
//!        ▼
//! AES-128 single block over "EN-RPI" ‖ 0⁶ ‖ ENIN (LE u32)
//!        │
//!        ▼
//! RPI (16-byte broadcast identifier)
//! ```
//!
//! # Determinism
//!
//! The same `(TEK, ENIN)` pair always yields the same RPI bytes. There is no
//! nonce, IV, or randomness anywhere in the pipeline; reproducibility is what
//! makes retroactive exposure matching possible.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod enin;
pub mod rpi;
pub mod tek;

pub use enin::{EPOCH_SECONDS, Enin};
pub use rpi::{RPI_LEN, Rpi, derive_rpi, derive_rpik};
pub use tek::{KeyError, TEK_LEN, Tek};
