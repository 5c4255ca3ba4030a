//! Section state persisted in `localStorage`.
use collapse_core::{CollapseStorage, StateTable, StorageError};
use gloo::storage::errors::StorageError as LocalStorageError;
use gloo::storage::{LocalStorage, Storage};

use crate::dom::{js_error_message, local_storage};

/// Key holding the JSON document of every persistent container.
pub const STATE_KEY: &str = "collapse.state";

/// [`CollapseStorage`] backed by one `localStorage` entry.
///
/// The table is re-read on every access so several controllers on one page never
/// overwrite each other's containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStateStorage;

impl LocalStateStorage {
    /// Load the whole table.
    ///
    /// # Errors
    /// Fails when `localStorage` is unreachable or the entry is not valid JSON.
    pub fn load_table(self) -> Result<StateTable, StorageError> {
        ensure_available()?;
        match LocalStorage::get::<StateTable>(STATE_KEY) {
            Ok(table) => Ok(table),
            Err(LocalStorageError::KeyNotFound(_)) => Ok(StateTable::default()),
            Err(err) => Err(storage_error(err)),
        }
    }

    /// Replace the stored table.
    ///
    /// # Errors
    /// Fails when `localStorage` is unreachable or rejects the write.
    pub fn save_table(self, table: &StateTable) -> Result<(), StorageError> {
        ensure_available()?;
        LocalStorage::set(STATE_KEY, table).map_err(storage_error)
    }

    /// Forget the saved states of one container.
    ///
    /// # Errors
    /// Same as [`Self::save_table`].
    pub fn clear(self, container_id: &str) -> Result<(), StorageError> {
        let mut table = self.load_table()?;
        table.remove(container_id);
        self.save_table(&table)
    }
}

// gloo throws when the storage handle is missing, e.g. in private browsing.
fn ensure_available() -> Result<(), StorageError> {
    local_storage()
        .map(drop)
        .map_err(|err| StorageError::Unavailable(js_error_message(&err)))
}

fn storage_error(err: LocalStorageError) -> StorageError {
    match err {
        LocalStorageError::SerdeError(err) => StorageError::Corrupt(err),
        other => StorageError::Unavailable(other.to_string()),
    }
}

impl CollapseStorage for LocalStateStorage {
    fn read(&self, container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        Ok(self.load_table()?.states(container_id))
    }

    fn write(&mut self, container_id: &str, index: usize, open: bool) -> Result<(), StorageError> {
        let mut table = self.load_table()?;
        table.set(container_id, index, open);
        self.save_table(&table)
    }
}
