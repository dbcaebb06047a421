use serde::{Deserialize, Serialize};
use splitab_core::{AbError, AlternativeId, ExperimentId, OverrideSlots};

use crate::hash::bucket_index;

/// Where a resolved alternative came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    /// The caller's session forced the choice.
    Override,
    /// The bucketing hash chose it.
    Hash,
}

/// Result of resolving an identity against an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub alternative: AlternativeId,
    pub source: AssignmentSource,
}

/// Resolves identities to alternative indices for one experiment.
///
/// A session override wins unconditionally and is returned as recorded, even
/// when it points past `alternative_count`; the caller's lookup reports that.
/// Otherwise the index comes from [`bucket_index`]. The engine never writes
/// the override slot.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine<'a> {
    experiment_name: &'a str,
    experiment_id: ExperimentId,
    alternative_count: usize,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(
        experiment_name: &'a str,
        experiment_id: ExperimentId,
        alternative_count: usize,
    ) -> Self {
        Self {
            experiment_name,
            experiment_id,
            alternative_count,
        }
    }

    pub fn resolve(
        &self,
        identity: &str,
        session: &dyn OverrideSlots,
    ) -> Result<Assignment, AbError> {
        if let Some(alternative) = session.get(self.experiment_id) {
            return Ok(Assignment {
                alternative,
                source: AssignmentSource::Override,
            });
        }
        let alternative = bucket_index(self.experiment_name, identity, self.alternative_count)?;
        Ok(Assignment {
            alternative,
            source: AssignmentSource::Hash,
        })
    }
}
