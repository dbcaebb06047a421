//! Store key derivation for alternative tallies.

use crate::ids::{AlternativeId, ExperimentId};

/// The three tallies every alternative keeps in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tally {
    /// Set of identities ever assigned the alternative.
    Participants,
    /// Subset of participants that converted at least once.
    Converted,
    /// Counter of conversion events.
    Conversions,
}

impl Tally {
    /// All tallies in key order.
    pub const ALL: [Tally; 3] = [Tally::Participants, Tally::Converted, Tally::Conversions];

    /// Returns the key suffix for the tally.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tally::Participants => "participants",
            Tally::Converted => "converted",
            Tally::Conversions => "conversions",
        }
    }
}

/// Builds `{experiment}:alts:{alternative}:{tally}`.
pub fn tally_key(experiment: ExperimentId, alternative: AlternativeId, tally: Tally) -> String {
    format!("{}:alts:{}:{}", experiment, alternative, tally.as_str())
}
