#![deny(missing_docs)]
#![doc = "Core contracts and data types for the splitab assignment engine."]

use std::sync::Arc;

pub mod errors;
mod ids;
pub mod keys;
pub mod session;

pub use errors::{AbError, ErrorInfo};
pub use ids::{AlternativeId, ExperimentId};
pub use keys::{tally_key, Tally};
pub use session::{NoOverrides, OverrideSlots, SessionOverrides};

/// Capability contract for the shared key-value store holding every tally.
///
/// Each operation must be atomic on its own at the store level. No operation
/// spans more than one key, and callers never assume a transaction across
/// calls. Failures are reported as [`AbError::Store`] and are not retried here.
pub trait KeyValueStore: Send + Sync {
    /// Adds `member` to the set at `key`. Re-adding an existing member is a no-op.
    fn set_add(&self, key: &str, member: &str) -> Result<(), AbError>;

    /// Returns whether `member` belongs to the set at `key`.
    fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AbError>;

    /// Returns the number of members in the set at `key` (0 when absent).
    fn set_cardinality(&self, key: &str) -> Result<u64, AbError>;

    /// Increments the counter at `key` and returns its new value.
    fn counter_increment(&self, key: &str) -> Result<u64, AbError>;

    /// Returns the counter at `key` (0 when absent).
    fn counter_get(&self, key: &str) -> Result<u64, AbError>;

    /// Removes whatever set or counter lives at `key`.
    fn delete(&self, key: &str) -> Result<(), AbError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn set_add(&self, key: &str, member: &str) -> Result<(), AbError> {
        (**self).set_add(key, member)
    }

    fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AbError> {
        (**self).set_is_member(key, member)
    }

    fn set_cardinality(&self, key: &str) -> Result<u64, AbError> {
        (**self).set_cardinality(key)
    }

    fn counter_increment(&self, key: &str) -> Result<u64, AbError> {
        (**self).counter_increment(key)
    }

    fn counter_get(&self, key: &str) -> Result<u64, AbError> {
        (**self).counter_get(key)
    }

    fn delete(&self, key: &str) -> Result<(), AbError> {
        (**self).delete(key)
    }
}
