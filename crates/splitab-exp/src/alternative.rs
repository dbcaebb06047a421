use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use splitab_core::{tally_key, AbError, AlternativeId, ExperimentId, KeyValueStore, Tally};
use tracing::debug;

/// One arm of an experiment together with its tallies in the shared store.
///
/// Reads always go to the store; nothing is cached between calls.
#[derive(Clone)]
pub struct Alternative {
    experiment: ExperimentId,
    id: AlternativeId,
    value: Value,
    store: Arc<dyn KeyValueStore>,
}

impl Alternative {
    /// Creates the alternative at `id` within `experiment`.
    pub fn new(
        experiment: ExperimentId,
        id: AlternativeId,
        value: Value,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            experiment,
            id,
            value,
            store,
        }
    }

    /// Index of the alternative within its experiment.
    pub fn id(&self) -> AlternativeId {
        self.id
    }

    /// Experiment the alternative belongs to.
    pub fn experiment(&self) -> ExperimentId {
        self.experiment
    }

    /// Value handed back to callers assigned this alternative.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Number of distinct identities ever assigned this alternative.
    pub fn participants(&self) -> Result<u64, AbError> {
        self.store.set_cardinality(&self.key(Tally::Participants))
    }

    /// Number of distinct participants that converted at least once.
    pub fn converted_count(&self) -> Result<u64, AbError> {
        self.store.set_cardinality(&self.key(Tally::Converted))
    }

    /// Total conversion events, including repeats by the same identity.
    pub fn conversions(&self) -> Result<u64, AbError> {
        self.store.counter_get(&self.key(Tally::Conversions))
    }

    /// Marks `identity` as a participant. Repeating the call changes nothing.
    pub fn record_participation(&self, identity: &str) -> Result<(), AbError> {
        self.store.set_add(&self.key(Tally::Participants), identity)?;
        debug!(
            experiment = %self.experiment,
            alternative = %self.id,
            identity,
            "recorded participation"
        );
        Ok(())
    }

    /// Records a conversion if `identity` participated in this alternative.
    ///
    /// Returns `false` without touching the store when `identity` is not a
    /// participant. The membership check and the two writes are separate
    /// store calls, so concurrent duplicates may both increment the counter.
    pub fn record_conversion(&self, identity: &str) -> Result<bool, AbError> {
        if !self
            .store
            .set_is_member(&self.key(Tally::Participants), identity)?
        {
            debug!(
                experiment = %self.experiment,
                alternative = %self.id,
                identity,
                "dropped conversion from non-participant"
            );
            return Ok(false);
        }
        self.store.set_add(&self.key(Tally::Converted), identity)?;
        let total = self.store.counter_increment(&self.key(Tally::Conversions))?;
        debug!(
            experiment = %self.experiment,
            alternative = %self.id,
            identity,
            total,
            "recorded conversion"
        );
        Ok(true)
    }

    /// Deletes all three tallies for this alternative.
    pub fn reset(&self) -> Result<(), AbError> {
        for tally in Tally::ALL {
            self.store.delete(&self.key(tally))?;
        }
        Ok(())
    }

    fn key(&self, tally: Tally) -> String {
        tally_key(self.experiment, self.id, tally)
    }
}

impl fmt::Debug for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alternative")
            .field("experiment", &self.experiment)
            .field("id", &self.id)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
