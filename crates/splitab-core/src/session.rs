//! Per-session override slots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AlternativeId, ExperimentId};

/// Read/write access to the forced choices stored in one caller's session.
///
/// Implementations are private to a single session and need no locking.
pub trait OverrideSlots {
    /// Returns the forced alternative for the experiment, if any.
    fn get(&self, experiment: ExperimentId) -> Option<AlternativeId>;

    /// Records a forced alternative; `None` clears the slot.
    fn set(&mut self, experiment: ExperimentId, choice: Option<AlternativeId>);
}

/// Serializable override map suitable for cookie or server-side session storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SessionOverrides {
    slots: BTreeMap<ExperimentId, AlternativeId>,
}

impl SessionOverrides {
    /// Creates a session with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no experiment is overridden.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over the recorded overrides in experiment order.
    pub fn iter(&self) -> impl Iterator<Item = (ExperimentId, AlternativeId)> + '_ {
        self.slots.iter().map(|(exp, alt)| (*exp, *alt))
    }
}

impl OverrideSlots for SessionOverrides {
    fn get(&self, experiment: ExperimentId) -> Option<AlternativeId> {
        self.slots.get(&experiment).copied()
    }

    fn set(&mut self, experiment: ExperimentId, choice: Option<AlternativeId>) {
        match choice {
            Some(alternative) => {
                self.slots.insert(experiment, alternative);
            }
            None => {
                self.slots.remove(&experiment);
            }
        }
    }
}

/// A session that never carries overrides, for callers without session state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl OverrideSlots for NoOverrides {
    fn get(&self, _experiment: ExperimentId) -> Option<AlternativeId> {
        None
    }

    fn set(&mut self, _experiment: ExperimentId, _choice: Option<AlternativeId>) {}
}
