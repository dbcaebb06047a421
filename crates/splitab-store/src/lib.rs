//! Key-value store backends implementing the `splitab-core` store contract.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteOptions, SqliteStore};
