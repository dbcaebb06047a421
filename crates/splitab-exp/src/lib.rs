//! Deterministic A/B assignment backed by a shared key-value store.
//!
//! An [`AbTest`] resolves an identity to one of its alternatives with the
//! [`AssignmentEngine`], records participation on that [`Alternative`], and
//! later attributes conversions to the same alternative.

mod abtest;
mod alternative;
mod assign;
mod canonical;
mod config;
mod hash;
mod report;

pub use abtest::AbTest;
pub use alternative::Alternative;
pub use assign::{Assignment, AssignmentEngine, AssignmentSource};
pub use canonical::to_canonical_json_bytes;
pub use config::{ExperimentCatalog, ExperimentConfig};
pub use hash::{assignment_digest, bucket_index, definition_hash, reduce_digest};
pub use report::{AlternativeReport, ExperimentReport};
