//! File Intake: validate a browsed or dropped file before it reaches the form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Upload zones accept one file per field. The first candidate in the
//! expected media category wins; its size is then checked against the
//! category ceiling. Rejections are values, surfaced to the user as notices,
//! never panics or propagated errors past the intake boundary.

use std::fmt;

use crate::snapshot::FileRef;

/// Bytes per mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Media category of an upload zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn mime_prefix(self) -> &'static str {
        match self {
            Self::Image => "image/",
            Self::Video => "video/",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Size ceiling an upload zone of this kind uses unless told otherwise.
    #[must_use]
    pub fn default_max_size(self) -> u64 {
        match self {
            Self::Image => 5 * MIB,
            Self::Video => 50 * MIB,
        }
    }

    #[must_use]
    pub fn matches(self, mime: &str) -> bool {
        mime.starts_with(self.mime_prefix())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What an upload zone accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakePolicy {
    pub kind: MediaKind,
    /// Exact MIME allow-list; empty admits any type in the category.
    pub accepted_types: Vec<String>,
    /// Size ceiling in bytes.
    pub max_size: u64,
}

impl IntakePolicy {
    #[must_use]
    pub fn new(kind: MediaKind, max_size: u64) -> Self {
        Self { kind, accepted_types: Vec::new(), max_size }
    }

    /// Any type in the category, up to the kind's default ceiling.
    #[must_use]
    pub fn for_kind(kind: MediaKind) -> Self {
        Self::new(kind, kind.default_max_size())
    }

    #[must_use]
    pub fn with_accepted_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn admits_type(&self, mime: &str) -> bool {
        self.kind.matches(mime) && (self.accepted_types.is_empty() || self.accepted_types.iter().any(|t| t == mime))
    }
}

/// Why a file was refused. `Display` is the user-facing notice text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("No file selected.")]
    NoFiles,

    #[error("Invalid file type. Please upload only {kind}s.")]
    InvalidType { kind: MediaKind },

    #[error("File {name} exceeds {limit_mb}MB limit")]
    TooLarge { name: String, limit_mb: u64 },
}

/// Pick the file an upload zone keeps from a browse or drop.
///
/// # Errors
///
/// Returns [`IntakeError::NoFiles`] for an empty selection,
/// [`IntakeError::InvalidType`] when no candidate fits the policy, and
/// [`IntakeError::TooLarge`] when the chosen candidate exceeds the ceiling.
pub fn accept_file(candidates: &[FileRef], policy: &IntakePolicy) -> Result<FileRef, IntakeError> {
    if candidates.is_empty() {
        return Err(IntakeError::NoFiles);
    }
    let Some(file) = candidates.iter().find(|f| policy.admits_type(&f.mime)) else {
        return Err(IntakeError::InvalidType { kind: policy.kind });
    };
    if file.size > policy.max_size {
        return Err(IntakeError::TooLarge { name: file.name.clone(), limit_mb: policy.max_size.div_ceil(MIB) });
    }
    Ok(file.clone())
}

// =============================================================================
// DROP ZONE
// =============================================================================

/// Drag highlight state of an upload zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DragOver,
}

/// Drag-and-drop state machine: `Idle -> DragOver -> Idle`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DropZone {
    state: DragState,
}

impl DropZone {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::DragOver
    }

    pub fn drag_enter(&mut self) {
        self.state = DragState::DragOver;
    }

    /// Repeated while the item hovers the target.
    pub fn drag_over(&mut self) {
        self.state = DragState::DragOver;
    }

    pub fn drag_leave(&mut self) {
        self.state = DragState::Idle;
    }

    /// Drag ended elsewhere or was aborted; nothing is taken in.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Files dropped on the target; returns them for intake.
    pub fn drop_files(&mut self, files: Vec<FileRef>) -> Vec<FileRef> {
        self.state = DragState::Idle;
        files
    }
}

#[cfg(test)]
#[path = "intake_test.rs"]
mod tests;
