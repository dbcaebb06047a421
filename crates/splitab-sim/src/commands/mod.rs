use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use splitab_core::{KeyValueStore, SessionOverrides};
use splitab_exp::{AbTest, ExperimentCatalog};
use splitab_store::SqliteStore;
use tracing::debug;

pub mod admin;
pub mod record;

/// Catalog and store shared by every subcommand.
pub struct Context {
    pub catalog: ExperimentCatalog,
    pub store: Arc<dyn KeyValueStore>,
}

impl Context {
    pub fn open(catalog: &Path, store: &Path) -> Result<Self, Box<dyn Error>> {
        let catalog = ExperimentCatalog::load(catalog)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(store)?);
        Ok(Self { catalog, store })
    }

    pub fn experiment(&self, name: &str) -> Result<AbTest, Box<dyn Error>> {
        let config = self
            .catalog
            .get(name)
            .ok_or_else(|| format!("unknown experiment: {name}"))?;
        Ok(AbTest::from_config(config, Arc::clone(&self.store))?)
    }
}

pub fn load_session(path: Option<&Path>) -> Result<SessionOverrides, Box<dyn Error>> {
    match path {
        Some(path) if path.exists() => {
            let raw = fs::read_to_string(path)?;
            debug!(path = %path.display(), "loaded session");
            Ok(serde_json::from_str(&raw)?)
        }
        _ => Ok(SessionOverrides::new()),
    }
}

pub fn save_session(path: &Path, session: &SessionOverrides) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(session)?)?;
    Ok(())
}
