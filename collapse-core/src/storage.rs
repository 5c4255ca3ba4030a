//! Persistence of per-section open state.
//!
//! Saved state lives in a [`StateTable`]: container id → ordered list of `1` (open),
//! `0` (closed) or `null` (never written). Backends store the table as a single JSON
//! document.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Key-value persistence for collapse containers.
pub trait CollapseStorage {
    /// Saved states of `container_id`, indexed by section. Missing entries are `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or holds corrupt data.
    fn read(&self, container_id: &str) -> Result<Vec<Option<bool>>, StorageError>;

    /// Save the state of section `index` of `container_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&mut self, container_id: &str, index: usize, open: bool) -> Result<(), StorageError>;
}

/// Storage type for controllers built without persistence. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStorage;

impl CollapseStorage for NoStorage {
    fn read(&self, _container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        Err(StorageError::Unavailable("persistence disabled".into()))
    }

    fn write(&mut self, _container_id: &str, _index: usize, _open: bool) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("persistence disabled".into()))
    }
}

/// Saved states of every container, as stored by the JSON backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateTable(BTreeMap<String, Vec<Option<u8>>>);

impl StateTable {
    /// Parse a stored document. Blank input yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid state table.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn states(&self, container_id: &str) -> Vec<Option<bool>> {
        self.0
            .get(container_id)
            .map(|states| states.iter().map(|s| s.map(|v| v != 0)).collect())
            .unwrap_or_default()
    }

    /// Record one section, padding unseen positions with `null`.
    pub fn set(&mut self, container_id: &str, index: usize, open: bool) {
        let states = self.0.entry(container_id.to_string()).or_default();
        if states.len() <= index {
            states.resize(index + 1, None);
        }
        states[index] = Some(u8::from(open));
    }

    pub fn remove(&mut self, container_id: &str) -> bool {
        self.0.remove(container_id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In-process storage, used by tests, the tester and server-side rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    table: StateTable,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn table(&self) -> &StateTable {
        &self.table
    }
}

impl CollapseStorage for MemoryStorage {
    fn read(&self, container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        Ok(self.table.states(container_id))
    }

    fn write(&mut self, container_id: &str, index: usize, open: bool) -> Result<(), StorageError> {
        self.table.set(container_id, index, open);
        Ok(())
    }
}

impl<S: CollapseStorage + ?Sized> CollapseStorage for &mut S {
    fn read(&self, container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        (**self).read(container_id)
    }

    fn write(&mut self, container_id: &str, index: usize, open: bool) -> Result<(), StorageError> {
        (**self).write(container_id, index, open)
    }
}
