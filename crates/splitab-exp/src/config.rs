use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use splitab_core::{AbError, ErrorInfo, ExperimentId, KeyValueStore};

use crate::abtest::AbTest;

/// Catalog entry describing one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name: String,
    pub id: ExperimentId,
    /// Alternative values in index order; empty means `[true, false]`.
    #[serde(default)]
    pub alternatives: Vec<Value>,
}

/// Set of experiments loaded from a YAML catalog.
///
/// ```yaml
/// experiments:
///   - name: bg_color
///     id: 1
///     alternatives: [red, blue]
///   - name: new_checkout
///     id: 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExperimentCatalog {
    #[serde(default)]
    pub experiments: Vec<ExperimentConfig>,
}

impl ExperimentCatalog {
    /// Parses and validates a catalog from YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, AbError> {
        let catalog: Self = serde_yaml::from_str(raw).map_err(|err| {
            AbError::Config(
                ErrorInfo::new("splitab.catalog_parse", "failed to parse experiment catalog")
                    .with_hint(err.to_string()),
            )
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads, parses and validates the catalog at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AbError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            AbError::Config(
                ErrorInfo::new("splitab.catalog_read", "failed to read experiment catalog")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        Self::from_yaml_str(&raw).map_err(|err| match err {
            AbError::Config(info) => {
                AbError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Rejects duplicate names or ids and explicit single-alternative entries.
    pub fn validate(&self) -> Result<(), AbError> {
        let mut names = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for experiment in &self.experiments {
            if experiment.name.trim().is_empty() {
                return Err(AbError::Config(
                    ErrorInfo::new("splitab.catalog_name", "experiment is missing a name")
                        .with_context("id", experiment.id.to_string()),
                ));
            }
            if !names.insert(experiment.name.as_str()) {
                return Err(AbError::Config(
                    ErrorInfo::new("splitab.catalog_duplicate_name", "duplicate experiment name")
                        .with_context("name", experiment.name.clone()),
                ));
            }
            if !ids.insert(experiment.id) {
                return Err(AbError::Config(
                    ErrorInfo::new("splitab.catalog_duplicate_id", "duplicate experiment id")
                        .with_context("id", experiment.id.to_string()),
                ));
            }
            if experiment.alternatives.len() == 1 {
                return Err(AbError::Definition(
                    ErrorInfo::new(
                        "splitab.definition_count",
                        "an experiment needs at least two alternatives",
                    )
                    .with_context("experiment", experiment.name.clone())
                    .with_context("alternatives", "1"),
                ));
            }
        }
        Ok(())
    }

    /// Looks up an experiment by name.
    pub fn get(&self, name: &str) -> Option<&ExperimentConfig> {
        self.experiments.iter().find(|exp| exp.name == name)
    }

    /// Builds a committed [`AbTest`] for every entry, in catalog order.
    pub fn build(&self, store: Arc<dyn KeyValueStore>) -> Result<Vec<AbTest>, AbError> {
        self.experiments
            .iter()
            .map(|config| AbTest::from_config(config, Arc::clone(&store)))
            .collect()
    }
}
