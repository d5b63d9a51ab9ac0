//! # Command Session
//!
//! Resolves configuration and the customer store once per invocation and
//! hands commands a [`CustomerBook`] to work on.
//!
//! Configuration is taken from `--config` when given, otherwise from
//! `stampbook.yaml` in the working directory if present, otherwise the
//! built-in defaults. `--store` overrides the configured `store_path`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stampbook_core::{Customer, CustomerId};
use stampbook_ledger::{
    CustomerBook, CustomerStore, JsonFileStore, LedgerConfig, MigrationResolver,
};

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stampbook.yaml";

/// Settings and storage for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Session {
    config: LedgerConfig,
    store: JsonFileStore,
}

impl Session {
    /// Resolve configuration and store from the global flags.
    pub fn open(config_path: Option<&Path>, store_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => LedgerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    LedgerConfig::load(implicit)
                        .with_context(|| format!("failed to load config {DEFAULT_CONFIG_FILE}"))?
                } else {
                    LedgerConfig::default()
                }
            }
        };
        Ok(Self::new(config, store_path))
    }

    /// Session over an explicit configuration.
    pub fn new(config: LedgerConfig, store_path: Option<PathBuf>) -> Self {
        let path = store_path.unwrap_or_else(|| config.store_path.clone());
        tracing::debug!(store = %path.display(), "using customer store");
        Self {
            config,
            store: JsonFileStore::new(path),
        }
    }

    /// The configuration in force.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }

    /// Load the full collection.
    pub fn load(&self) -> Result<Vec<Customer>> {
        self.store
            .load()
            .with_context(|| format!("failed to load customers from {}", self.store.path().display()))
    }

    /// Load the collection into a book.
    pub fn load_book(&self) -> Result<CustomerBook> {
        Ok(CustomerBook::new(self.load()?, &self.config))
    }

    /// Persist a collection.
    pub fn save(&self, customers: &[Customer]) -> Result<()> {
        self.store
            .save(customers)
            .with_context(|| format!("failed to save customers to {}", self.store.path().display()))
    }

    /// A migration resolver for the configured policy.
    pub fn resolver(&self) -> MigrationResolver {
        MigrationResolver::new(&self.config)
    }
}

/// Resolve a customer code typed by the operator to its handle.
pub fn customer_id_for_code(book: &CustomerBook, code: &str) -> Result<CustomerId> {
    book.find_by_code(code)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow::anyhow!("no customer with code {:?}", code.trim()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A session over a fresh temporary store. Keep the `TempDir` alive
    /// for the duration of the test.
    pub fn temp_session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(
            LedgerConfig::default(),
            Some(dir.path().join("stampbook.json")),
        );
        (dir, session)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::temp_session;
    use super::*;

    #[test]
    fn store_override_wins_over_config() {
        let config = LedgerConfig {
            store_path: PathBuf::from("configured.json"),
            ..LedgerConfig::default()
        };
        let s = Session::new(config.clone(), Some(PathBuf::from("override.json")));
        assert_eq!(s.store().path(), Path::new("override.json"));
        let s = Session::new(config, None);
        assert_eq!(s.store().path(), Path::new("configured.json"));
    }

    #[test]
    fn open_with_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("shop.yaml");
        std::fs::write(&cfg, "stamps_per_reward: 5\n").unwrap();
        let s = Session::open(Some(&cfg), Some(dir.path().join("c.json"))).unwrap();
        assert_eq!(s.config().stamps_per_reward, 5);
    }

    #[test]
    fn open_with_missing_config_fails() {
        let err = Session::open(Some(Path::new("/nonexistent/shop.yaml")), None).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }

    #[test]
    fn empty_store_loads_empty_book() {
        let (_dir, s) = temp_session();
        assert!(s.load_book().unwrap().is_empty());
    }
}
