//! Form Session: the live, observable state of one open form.
//!
//! SYSTEM CONTEXT
//! ==============
//! A session owns the field values for the form on screen, the per-field
//! validation errors, the submission status and a queue of user-facing
//! notices. It is the only writer into its draft slot: every value change
//! re-arms a debounced autosave through the `DraftStore`, `mount` restores
//! the slot, and an accepted submission clears it for good.
//!
//! DESIGN
//! ======
//! - Values start at the schema defaults and only ever hold declared fields
//!   with the declared shape.
//! - Validation runs per field on change and for the whole form on submit.
//! - One autosave is pending at a time. Each change cancels the previous
//!   handle before scheduling the next, and dropping the session cancels the
//!   last one.
//! - The session's sanitizer applies to manual saves as well as autosaves, so
//!   no persist path writes live file handles.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::envelope::SubmitOutcome;
use crate::intake::{IntakeError, IntakePolicy, accept_file};
use crate::schedule::CancelHandle;
use crate::schema::{FieldErrors, FieldKind, FormSchema, MultipartField};
use crate::snapshot::{FieldValue, FileRef, Snapshot};
use crate::store::{DraftError, DraftStore, Sanitizer};

/// Error slot for submission failures, shown above the form.
pub const SUBMIT_ERROR_FIELD: &str = "submit";

pub const DRAFT_SAVED: &str = "Post saved as draft successfully";
pub const DRAFT_SAVE_FAILED: &str = "Failed to save draft.";
pub const REAUTHENTICATE: &str = "Please log in again to continue";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, user-visible notification (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("form has no field named {0:?}")]
    UnknownField(String),

    #[error("field {field:?} expects a {expected:?} value")]
    KindMismatch { field: String, expected: FieldKind },

    #[error(transparent)]
    Intake(#[from] IntakeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&Snapshot)>;

pub struct FormSession {
    schema: Arc<dyn FormSchema>,
    values: Snapshot,
    errors: FieldErrors,
    status: SubmitStatus,
    notices: Vec<Notice>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    drafts: DraftStore,
    draft_key: String,
    sanitizer: Option<Sanitizer>,
    pending_save: Option<CancelHandle>,
}

impl FormSession {
    #[must_use]
    pub fn new(schema: Arc<dyn FormSchema>, drafts: DraftStore, draft_key: impl Into<String>) -> Self {
        let values = schema.defaults();
        Self {
            schema,
            values,
            errors: FieldErrors::new(),
            status: SubmitStatus::Idle,
            notices: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            drafts,
            draft_key: draft_key.into(),
            sanitizer: None,
            pending_save: None,
        }
    }

    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn values(&self) -> &Snapshot {
        &self.values
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand queued notices to the UI, leaving the queue empty.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[must_use]
    pub fn draft_key(&self) -> &str {
        &self.draft_key
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Restore the persisted draft into the form, then autosave once.
    ///
    /// Returns the number of fields restored.
    pub fn mount(&mut self) -> usize {
        let schema = Arc::clone(&self.schema);
        let values = &mut self.values;
        let mut restored = 0;
        self.drafts.load(&self.draft_key, |field, value| match schema.field(field) {
            Some(spec) if spec.kind.admits(&value) => {
                values.insert(field.to_owned(), value);
                restored += 1;
            }
            Some(_) => warn!(%field, "draft value has the wrong shape; keeping default"),
            None => debug!(%field, "ignoring draft field the form does not declare"),
        });
        if restored > 0 {
            info!(key = %self.draft_key, restored, "draft restored");
        }
        self.changed();
        restored
    }

    /// Set one field, revalidate it, notify listeners and re-arm the autosave.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for undeclared fields and
    /// [`FormError::KindMismatch`] when `value` has the wrong shape. The form
    /// is unchanged in both cases.
    pub fn set_value(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let kind = self.kind_of(field)?;
        if !kind.admits(&value) {
            return Err(FormError::KindMismatch { field: field.to_owned(), expected: kind });
        }
        self.values.insert(field.to_owned(), value);
        self.revalidate_field(field);
        self.changed();
        Ok(())
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Snapshot) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Persist the current values now, outside the debounce window.
    ///
    /// # Errors
    ///
    /// Returns the storage or serialization failure after queuing an error notice.
    pub fn save_draft(&mut self) -> Result<(), DraftError> {
        match self.drafts.save_now(&self.draft_key, self.values.clone(), self.sanitizer) {
            Ok(()) => {
                self.notices.push(Notice::success(DRAFT_SAVED));
                Ok(())
            }
            Err(e) => {
                warn!(key = %self.draft_key, error = %e, "manual draft save failed");
                self.notices.push(Notice::error(DRAFT_SAVE_FAILED));
                Err(e)
            }
        }
    }

    // =========================================================================
    // FILES
    // =========================================================================

    /// Run File Intake over `candidates` and store the accepted file in `field`,
    /// replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Intake`] when the candidates are refused (an error
    /// notice is queued and the field keeps its value), or the field errors of
    /// [`FormSession::set_value`] when `field` is not a file field.
    pub fn accept_file(&mut self, field: &str, candidates: &[FileRef], policy: &IntakePolicy) -> Result<(), FormError> {
        let kind = self.kind_of(field)?;
        if !matches!(kind, FieldKind::File(_)) {
            return Err(FormError::KindMismatch { field: field.to_owned(), expected: kind });
        }
        match accept_file(candidates, policy) {
            Ok(file) => self.set_value(field, FieldValue::File(file)),
            Err(e) => {
                debug!(%field, error = %e, "file refused");
                self.notices.push(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Drop the selected file from `field`.
    ///
    /// # Errors
    ///
    /// Same as [`FormSession::set_value`].
    pub fn clear_file(&mut self, field: &str) -> Result<(), FormError> {
        self.set_value(field, FieldValue::Null)
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Validate every field. Any pending submission error is kept.
    pub fn validate(&mut self) -> bool {
        let submit_error = self.errors.remove(SUBMIT_ERROR_FIELD);
        self.errors = self.schema.validate(&self.values);
        let valid = self.errors.is_empty();
        if let Some(message) = submit_error {
            self.errors.insert(SUBMIT_ERROR_FIELD.to_owned(), message);
        }
        valid
    }

    /// Start a submission: validate, mark `Submitting` and return the payload.
    ///
    /// Returns `None` when the form is invalid or a submission is in flight.
    pub fn begin_submit(&mut self) -> Option<Vec<MultipartField>> {
        if self.is_submitting() {
            return None;
        }
        if !self.validate() {
            debug!(errors = self.errors.len(), "submission blocked by validation");
            return None;
        }
        self.errors.remove(SUBMIT_ERROR_FIELD);
        self.status = SubmitStatus::Submitting;
        Some(self.schema.multipart(&self.values))
    }

    pub fn finish_submit(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Accepted(_) => {
                self.cancel_pending_save();
                self.drafts.remove(&self.draft_key);
                self.status = SubmitStatus::Succeeded;
                self.notices.push(Notice::success(self.schema.submitted_notice()));
                info!(key = %self.draft_key, "submission accepted; draft cleared");
            }
            SubmitOutcome::Reauthenticate => {
                self.status = SubmitStatus::Failed;
                self.notices.push(Notice::error(REAUTHENTICATE));
                warn!("submission refused; session needs to sign in again");
            }
            SubmitOutcome::Rejected(message) => {
                warn!(%message, "submission rejected");
                self.status = SubmitStatus::Failed;
                self.errors.insert(SUBMIT_ERROR_FIELD.to_owned(), message.clone());
                self.notices.push(Notice::error(message));
            }
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn kind_of(&self, field: &str) -> Result<FieldKind, FormError> {
        self.schema
            .field(field)
            .map(|spec| spec.kind)
            .ok_or_else(|| FormError::UnknownField(field.to_owned()))
    }

    fn revalidate_field(&mut self, field: &str) {
        match self.schema.validate(&self.values).remove(field) {
            Some(message) => {
                self.errors.insert(field.to_owned(), message);
            }
            None => {
                self.errors.remove(field);
            }
        }
    }

    /// A submitted form has no draft; later edits notify listeners only.
    fn changed(&mut self) {
        for (_, listener) in &self.listeners {
            listener(&self.values);
        }
        if self.status == SubmitStatus::Succeeded {
            return;
        }
        self.cancel_pending_save();
        self.pending_save = Some(self.drafts.save(&self.draft_key, self.values.clone(), self.sanitizer));
    }

    fn cancel_pending_save(&mut self) {
        if let Some(handle) = self.pending_save.take() {
            handle.cancel();
        }
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        self.cancel_pending_save();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
