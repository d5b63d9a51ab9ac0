//! # Persistence Collaborator
//!
//! The ledger consumes exactly two operations from storage: load the whole
//! current collection, and save whatever collection the ledger hands back.
//! There is no partial write or query interface.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use stampbook_core::Customer;

use crate::error::StoreError;

/// Whole-collection storage.
pub trait CustomerStore {
    /// Load the full current collection. A store that has never been
    /// written returns an empty collection.
    fn load(&self) -> Result<Vec<Customer>, StoreError>;

    /// Replace the stored collection.
    fn save(&self, customers: &[Customer]) -> Result<(), StoreError>;
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RefCell<Vec<Customer>>,
}

impl MemoryStore {
    /// A store pre-seeded with `customers`.
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: RefCell::new(customers),
        }
    }
}

impl CustomerStore for MemoryStore {
    fn load(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.customers.borrow().clone())
    }

    fn save(&self, customers: &[Customer]) -> Result<(), StoreError> {
        *self.customers.borrow_mut() = customers.to_vec();
        Ok(())
    }
}

/// A JSON array of customers in a single file.
///
/// Saves write a sibling temporary file and rename it over the target, so
/// a crash mid-write leaves the previous collection intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CustomerStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Customer>, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "store file absent; starting empty");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let customers: Vec<Customer> = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            count = customers.len(),
            "loaded customer collection"
        );
        Ok(customers)
    }

    fn save(&self, customers: &[Customer]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(customers)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!(
            path = %self.path.display(),
            count = customers.len(),
            "saved customer collection"
        );
        Ok(())
    }
}
