//! Diagnosis-service seam.
//!
//! The key-management and report-storage service is an external
//! collaborator; the core depends on this logical contract only. Transport,
//! RPC mechanism, and serialization framing belong to the glue layer outside
//! this workspace. The harness provides an in-memory implementation for
//! deterministic simulation.

use crate::{
    error::ProtocolError,
    record::{AuthorizationToken, KeyRecord, TokenRequest},
};

/// Finite, non-restartable stream of disclosed key records.
///
/// Any element carrying an error invalidates the whole fetch; consumers must
/// treat the first `Err` as fatal to the enclosing operation.
pub type KeyStream<'a> = Box<dyn Iterator<Item = Result<KeyRecord, ProtocolError>> + 'a>;

/// Operations the core requires from the external diagnosis service.
///
/// All three calls are blocking I/O from the calling participant's
/// perspective; drivers should treat each participant's rollover work as an
/// independently bounded unit so one slow call does not stall unrelated
/// participants.
pub trait DiagnosisService {
    /// Request a scoped authorization token.
    ///
    /// A returned error means the call failed and no token is usable.
    fn request_authorization(
        &self,
        request: &TokenRequest,
    ) -> Result<AuthorizationToken, ProtocolError>;

    /// Submit disclosed key records, presenting a previously issued token.
    ///
    /// A returned error means the submission did not take effect.
    fn submit_report(
        &self,
        token: &AuthorizationToken,
        records: &[KeyRecord],
    ) -> Result<(), ProtocolError>;

    /// Fetch all key records disclosed within the most recent
    /// `historical_days` days.
    fn fetch_diagnosis_keys(&self, historical_days: u32) -> KeyStream<'_>;
}
