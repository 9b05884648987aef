//! Observation ledger: identifiers overheard from nearby participants.
//!
//! Strictly append-only for the life of the participant. Observations are
//! never deduplicated or removed - the append history is the record of what
//! was heard, while a hash index keeps membership tests sublinear as the
//! ledger grows unbounded over a long-running session.

use std::collections::HashSet;

use proxim_crypto::Rpi;

/// Append-only collection of observed rolling proximity identifiers.
#[derive(Debug, Clone, Default)]
pub struct ObservationLedger {
    /// Every observation in arrival order, duplicates included
    seen: Vec<Rpi>,
    /// Membership index over `seen`
    index: HashSet<Rpi>,
}

impl ObservationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observed identifier.
    pub fn record(&mut self, rpi: Rpi) {
        self.seen.push(rpi);
        self.index.insert(rpi);
    }

    /// Whether this identifier has ever been observed.
    pub fn contains(&self, rpi: &Rpi) -> bool {
        self.index.contains(rpi)
    }

    /// Number of observations recorded, duplicates included.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Observations in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Rpi> {
        self.seen.iter()
    }
}
