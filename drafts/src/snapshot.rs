//! Draft snapshot model.
//!
//! A snapshot is the set of field values captured from a live form. Values
//! are limited to what survives a JSON round trip plus in-memory file
//! handles, which never do: a `File` value always serializes as `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Field name -> value, ordered by field name.
pub type Snapshot = BTreeMap<String, FieldValue>;

/// Descriptor for a user-selected file held by the browser.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    /// MIME type as reported by the browser, e.g. `image/png`.
    pub mime: String,
    /// Size in bytes.
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl FileRef {
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), mime: mime.into(), size, last_modified: 0 }
    }

    #[must_use]
    pub fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Identity used for upload dedupe: name, size and modification time.
    #[must_use]
    pub fn is_same_file(&self, other: &Self) -> bool {
        self.name == other.name && self.size == other.size && self.last_modified == other.last_modified
    }
}

/// A single form field value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    File(FileRef),
    #[default]
    Null,
}

impl FieldValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// `true` for values that must never overwrite a live field on restore.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Recover a value from a persisted record.
    ///
    /// Strings, arrays of strings and `null` are representable; anything else
    /// (numbers, objects, mixed arrays) yields `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            // EDGE: live file handles have no durable form.
            Self::File(_) | Self::Null => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
