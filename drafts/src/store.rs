//! Draft Store: debounced, sanitized persistence of form snapshots.
//!
//! DESIGN
//! ======
//! `save` defers the write by the debounce window and returns the task's
//! `CancelHandle`. Callers cancel the previous handle before each new save,
//! so a burst of saves within one window collapses to the last one.
//!
//! ERROR HANDLING
//! ==============
//! A draft is a convenience, never a requirement. Debounced writes, loads and
//! removals log failures with `tracing` and carry on; the form stays usable
//! without a persisted draft. Only the explicit `save_now`/`read` paths
//! return errors, for callers that report them to the user.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::schedule::{CancelHandle, Scheduler};
use crate::snapshot::{FieldValue, Snapshot};
use crate::storage::{DraftStorage, StorageError};

/// Delay between the last `save` and the storage write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Pure snapshot transform applied right before serialization.
///
/// This is the only sanctioned place to drop fields that cannot be persisted.
pub type Sanitizer = fn(Snapshot) -> Snapshot;

/// Errors from the explicit draft paths.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("draft serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("draft record is not valid JSON: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("draft record is not a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Keyed draft persistence over a storage backend and a scheduler.
#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn DraftStorage>,
    scheduler: Arc<dyn Scheduler>,
    debounce: Duration,
}

impl DraftStore {
    #[must_use]
    pub fn new(storage: Arc<dyn DraftStorage>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self { storage, scheduler, debounce: DEFAULT_DEBOUNCE }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Schedule a debounced write of `data` (sanitized first, if given) under `key`.
    pub fn save(&self, key: &str, data: Snapshot, sanitize: Option<Sanitizer>) -> CancelHandle {
        let storage = Arc::clone(&self.storage);
        let key = key.to_owned();
        self.scheduler.schedule(
            self.debounce,
            Box::new(move || match write_record(storage.as_ref(), &key, data, sanitize) {
                Ok(()) => debug!(%key, "draft autosaved"),
                Err(e) => warn!(%key, error = %e, "draft autosave failed"),
            }),
        )
    }

    /// Write immediately, bypassing the debounce window.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or stored.
    pub fn save_now(&self, key: &str, data: Snapshot, sanitize: Option<Sanitizer>) -> Result<(), DraftError> {
        write_record(self.storage.as_ref(), key, data, sanitize)
    }

    /// Read the persisted record at `key` as stored, `null` fields included.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or the record is not a JSON object.
    pub fn read(&self, key: &str) -> Result<Option<Snapshot>, DraftError> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        parse_record(&raw).map(Some)
    }

    /// Push every persisted non-null field at `key` into `apply`.
    ///
    /// Returns the number of fields applied; `0` when no usable record exists.
    pub fn load<F>(&self, key: &str, mut apply: F) -> usize
    where
        F: FnMut(&str, FieldValue),
    {
        let record = match self.read(key) {
            Ok(Some(record)) => record,
            Ok(None) => return 0,
            Err(e) => {
                warn!(%key, error = %e, "draft load failed; keeping form defaults");
                return 0;
            }
        };

        let mut applied = 0;
        for (field, value) in record {
            if value.is_absent() {
                continue;
            }
            apply(&field, value);
            applied += 1;
        }
        applied
    }

    /// Delete the record at `key`. Removing a missing record is a no-op.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!(%key, error = %e, "draft remove failed");
        }
    }
}

/// Stock sanitizer: null every file-valued field.
#[must_use]
pub fn null_file_fields(mut data: Snapshot) -> Snapshot {
    for value in data.values_mut() {
        if matches!(value, FieldValue::File(_)) {
            *value = FieldValue::Null;
        }
    }
    data
}

fn write_record(
    storage: &dyn DraftStorage,
    key: &str,
    data: Snapshot,
    sanitize: Option<Sanitizer>,
) -> Result<(), DraftError> {
    let data = match sanitize {
        Some(sanitize) => sanitize(data),
        None => data,
    };
    let raw = serde_json::to_string(&data).map_err(DraftError::Serialize)?;
    storage.set(key, &raw)?;
    Ok(())
}

fn parse_record(raw: &str) -> Result<Snapshot, DraftError> {
    let value: Value = serde_json::from_str(raw).map_err(DraftError::Deserialize)?;
    let Value::Object(fields) = value else {
        return Err(DraftError::NotAnObject);
    };

    let mut snapshot = Snapshot::new();
    for (field, raw_value) in fields {
        match FieldValue::from_json(&raw_value) {
            Some(value) => {
                snapshot.insert(field, value);
            }
            None => warn!(%field, "skipping unrepresentable draft field"),
        }
    }
    Ok(snapshot)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
