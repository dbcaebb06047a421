use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Stable identifier of an experiment, used to namespace every store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExperimentId(u64);

impl ExperimentId {
    /// Creates a new identifier from its raw integer representation.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based position of an alternative within its experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlternativeId(usize);

impl AlternativeId {
    /// Creates an identifier from an alternative index.
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index this identifier refers to.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for AlternativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
