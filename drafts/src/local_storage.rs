//! Browser `localStorage` backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Hydrate-only. The window and storage object are looked up on every call so
//! the backend holds no JS handles and can cross into scheduled tasks.

use crate::storage::{DraftStorage, StorageError};

/// `window.localStorage` as a [`DraftStorage`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

fn storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| StorageError::Unavailable("window.localStorage".to_owned()))
}

impl DraftStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        storage()?
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Browsers report quota exhaustion as a thrown DOMException.
        storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        storage()?
            .remove_item(key)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }
}
