use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use splitab_core::{AbError, AlternativeId, ErrorInfo, ExperimentId, KeyValueStore, OverrideSlots};
use tracing::{debug, info, warn};

use crate::alternative::Alternative;
use crate::assign::{Assignment, AssignmentEngine, AssignmentSource};
use crate::config::ExperimentConfig;
use crate::hash::definition_hash;
use crate::report::{AlternativeReport, ExperimentReport};

/// An experiment with its ordered alternatives, backed by a shared store.
///
/// Alternatives must be defined and committed with [`AbTest::save`] before
/// identities can be assigned. Redefining replaces every alternative and
/// index; overrides recorded against the old indices are not reconciled.
#[derive(Clone)]
pub struct AbTest {
    name: String,
    id: ExperimentId,
    alternatives: Vec<Alternative>,
    committed: bool,
    store: Arc<dyn KeyValueStore>,
}

impl AbTest {
    /// Creates an experiment with no alternatives.
    pub fn new(name: impl Into<String>, id: ExperimentId, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            name: name.into(),
            id,
            alternatives: Vec::new(),
            committed: false,
            store,
        }
    }

    /// Defines and commits an experiment described by a catalog entry.
    pub fn from_config(
        config: &ExperimentConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AbError> {
        let mut test = Self::new(config.name.clone(), config.id, store);
        test.define_alternatives(config.alternatives.iter().cloned());
        test.save()?;
        Ok(test)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> ExperimentId {
        self.id
    }

    /// Current alternatives in index order.
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Whether the current definition passed [`AbTest::save`].
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Replaces the alternatives with `values`, indexed from zero.
    ///
    /// No values at all defines the boolean experiment `[true, false]`. The
    /// new definition must be committed again with [`AbTest::save`].
    pub fn define_alternatives<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let mut values: Vec<Value> = values.into_iter().collect();
        if values.is_empty() {
            values = vec![Value::Bool(true), Value::Bool(false)];
        }
        self.alternatives = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                Alternative::new(
                    self.id,
                    AlternativeId::from_index(index),
                    value,
                    Arc::clone(&self.store),
                )
            })
            .collect();
        self.committed = false;
        debug!(
            experiment = %self.id,
            name = %self.name,
            alternatives = self.alternatives.len(),
            "defined alternatives"
        );
    }

    /// Commits the definition; fewer than two alternatives is rejected.
    pub fn save(&mut self) -> Result<(), AbError> {
        if self.alternatives.len() < 2 {
            return Err(AbError::Definition(
                ErrorInfo::new(
                    "splitab.definition_count",
                    "an experiment needs at least two alternatives",
                )
                .with_context("experiment", self.name.clone())
                .with_context("alternatives", self.alternatives.len().to_string()),
            ));
        }
        self.committed = true;
        Ok(())
    }

    /// Assigns `identity`, records its participation and returns the value.
    pub fn choose(&self, identity: &str, session: &dyn OverrideSlots) -> Result<&Value, AbError> {
        let alternative = self.resolve(identity, session)?;
        alternative.record_participation(identity)?;
        Ok(alternative.value())
    }

    /// Attributes a conversion by `identity` to the alternative it resolves to.
    ///
    /// Resolution follows the same rule as [`AbTest::choose`]. Identities that
    /// never participated there are ignored. Returns the alternative's id.
    pub fn record_conversion(
        &self,
        identity: &str,
        session: &dyn OverrideSlots,
    ) -> Result<AlternativeId, AbError> {
        let alternative = self.resolve(identity, session)?;
        alternative.record_conversion(identity)?;
        Ok(alternative.id())
    }

    /// Resolves `identity` without recording anything.
    pub fn preview(
        &self,
        identity: &str,
        session: &dyn OverrideSlots,
    ) -> Result<Assignment, AbError> {
        self.ensure_committed()?;
        self.engine().resolve(identity, session)
    }

    /// Forces the session onto the first alternative carrying `value`.
    ///
    /// `None` clears the override. An unknown value fails without touching
    /// the session.
    pub fn force_selection(
        &self,
        value: Option<&Value>,
        session: &mut dyn OverrideSlots,
    ) -> Result<(), AbError> {
        let Some(value) = value else {
            session.set(self.id, None);
            info!(experiment = %self.id, "cleared forced selection");
            return Ok(());
        };
        let alternative = self
            .alternatives
            .iter()
            .find(|alt| alt.value() == value)
            .ok_or_else(|| {
                AbError::InvalidOverride(
                    ErrorInfo::new(
                        "splitab.override_value",
                        "no alternative carries the forced value",
                    )
                    .with_context("experiment", self.name.clone())
                    .with_context("value", value.to_string()),
                )
            })?;
        session.set(self.id, Some(alternative.id()));
        info!(
            experiment = %self.id,
            alternative = %alternative.id(),
            "forced selection"
        );
        Ok(())
    }

    /// Snapshot of every alternative's tallies.
    pub fn report(&self) -> Result<ExperimentReport, AbError> {
        let values: Vec<Value> = self
            .alternatives
            .iter()
            .map(|alt| alt.value().clone())
            .collect();
        let alternatives = self
            .alternatives
            .iter()
            .map(AlternativeReport::collect)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExperimentReport {
            name: self.name.clone(),
            id: self.id,
            definition_hash: definition_hash(&self.name, &values)?,
            alternatives,
        })
    }

    /// Clears the tallies of every current alternative.
    pub fn reset(&self) -> Result<(), AbError> {
        for alternative in &self.alternatives {
            alternative.reset()?;
        }
        info!(experiment = %self.id, name = %self.name, "reset tallies");
        Ok(())
    }

    fn engine(&self) -> AssignmentEngine<'_> {
        AssignmentEngine::new(&self.name, self.id, self.alternatives.len())
    }

    fn ensure_committed(&self) -> Result<(), AbError> {
        if self.committed {
            return Ok(());
        }
        Err(AbError::Definition(
            ErrorInfo::new(
                "splitab.definition_uncommitted",
                "experiment definition has not been saved",
            )
            .with_context("experiment", self.name.clone())
            .with_hint("call save() after define_alternatives()"),
        ))
    }

    fn resolve(
        &self,
        identity: &str,
        session: &dyn OverrideSlots,
    ) -> Result<&Alternative, AbError> {
        let assignment = self.preview(identity, session)?;
        let index = assignment.alternative.index();
        match self.alternatives.get(index) {
            Some(alternative) => Ok(alternative),
            None => {
                warn!(
                    experiment = %self.id,
                    index,
                    alternatives = self.alternatives.len(),
                    "override points past the defined alternatives"
                );
                let source = match assignment.source {
                    AssignmentSource::Override => "override",
                    AssignmentSource::Hash => "hash",
                };
                Err(AbError::OutOfRange(
                    ErrorInfo::new(
                        "splitab.override_range",
                        "resolved alternative index is out of range",
                    )
                    .with_context("experiment", self.name.clone())
                    .with_context("index", index.to_string())
                    .with_context("alternatives", self.alternatives.len().to_string())
                    .with_context("source", source)
                    .with_hint("clear the session override with force_selection(None)"),
                ))
            }
        }
    }
}

impl fmt::Debug for AbTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbTest")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("alternatives", &self.alternatives)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}
