use serde::{Deserialize, Serialize};
use serde_json::Value;
use splitab_core::{AbError, AlternativeId, ExperimentId};

use crate::alternative::Alternative;

/// Snapshot of one alternative's tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeReport {
    pub id: AlternativeId,
    pub value: Value,
    pub participants: u64,
    pub converted: u64,
    pub conversions: u64,
    /// `converted / participants`; absent until someone participates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
}

impl AlternativeReport {
    pub(crate) fn collect(alternative: &Alternative) -> Result<Self, AbError> {
        let participants = alternative.participants()?;
        let converted = alternative.converted_count()?;
        let conversions = alternative.conversions()?;
        let conversion_rate = if participants == 0 {
            None
        } else {
            Some(converted as f64 / participants as f64)
        };
        Ok(Self {
            id: alternative.id(),
            value: alternative.value().clone(),
            participants,
            converted,
            conversions,
            conversion_rate,
        })
    }
}

/// Read-only summary handed to report renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub name: String,
    pub id: ExperimentId,
    /// Hash of the alternative values the tallies were recorded under.
    pub definition_hash: String,
    pub alternatives: Vec<AlternativeReport>,
}

impl ExperimentReport {
    /// Total distinct participants across all alternatives.
    pub fn total_participants(&self) -> u64 {
        self.alternatives.iter().map(|alt| alt.participants).sum()
    }

    /// Total conversion events across all alternatives.
    pub fn total_conversions(&self) -> u64 {
        self.alternatives.iter().map(|alt| alt.conversions).sum()
    }
}
