//! Form schema contract.
//!
//! A schema names the fields a form owns, their value shapes, and a
//! black-box validation pass. The Form Session only ever stores fields the
//! schema declares, which keeps draft records free of foreign keys.

use std::collections::BTreeMap;

use crate::intake::MediaKind;
use crate::snapshot::{FieldValue, FileRef, Snapshot};

/// Field name -> first validation message.
pub type FieldErrors = BTreeMap<String, String>;

/// Value shape of a form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    File(MediaKind),
}

impl FieldKind {
    #[must_use]
    pub fn default_value(self) -> FieldValue {
        match self {
            Self::Text => FieldValue::Text(String::new()),
            Self::List => FieldValue::List(Vec::new()),
            Self::File(_) => FieldValue::Null,
        }
    }

    /// Whether `value` has the shape this field stores. File fields also hold `Null`.
    #[must_use]
    pub fn admits(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (Self::Text, FieldValue::Text(_))
                | (Self::List, FieldValue::List(_))
                | (Self::File(_), FieldValue::File(_) | FieldValue::Null)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// One part of a `multipart/form-data` submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(FileRef),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: PartValue,
}

impl MultipartField {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: PartValue::Text(value.into()) }
    }

    #[must_use]
    pub fn file(name: impl Into<String>, file: FileRef) -> Self {
        Self { name: name.into(), value: PartValue::File(file) }
    }
}

pub trait FormSchema: Send + Sync {
    /// Declared fields, in submission order.
    fn fields(&self) -> &[FieldSpec];

    /// Validate the whole form; an empty map means valid.
    fn validate(&self, values: &Snapshot) -> FieldErrors;

    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }

    fn defaults(&self) -> Snapshot {
        self.fields()
            .iter()
            .map(|spec| (spec.name.to_owned(), spec.kind.default_value()))
            .collect()
    }

    /// Serialize `values` for submission.
    fn multipart(&self, values: &Snapshot) -> Vec<MultipartField> {
        encode_multipart(self.fields(), values)
    }

    /// Notice shown once the backend accepts a submission.
    fn submitted_notice(&self) -> &'static str {
        "Submitted successfully"
    }
}

/// Encode fields in declaration order: lists as repeated `name[]` text
/// parts, files as file parts, text verbatim (empty included), nulls skipped.
#[must_use]
pub fn encode_multipart(fields: &[FieldSpec], values: &Snapshot) -> Vec<MultipartField> {
    let mut parts = Vec::new();
    for spec in fields {
        match values.get(spec.name) {
            Some(FieldValue::Text(text)) => parts.push(MultipartField::text(spec.name, text.clone())),
            Some(FieldValue::List(items)) => {
                let name = format!("{}[]", spec.name);
                parts.extend(items.iter().map(|item| MultipartField::text(name.clone(), item.clone())));
            }
            Some(FieldValue::File(file)) => parts.push(MultipartField::file(spec.name, file.clone())),
            Some(FieldValue::Null) | None => {}
        }
    }
    parts
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
