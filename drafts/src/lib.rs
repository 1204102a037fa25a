//! Draft persistence and form-session model for the admin blog editor.
//!
//! SYSTEM CONTEXT
//! ==============
//! This crate owns everything the authoring UI needs between a keystroke and
//! the backend: the live form state, debounced autosave into durable local
//! storage, rehydration on mount, file intake for the media upload zones, and
//! the `{success, data|message}` envelope shared with the proxy server.
//!
//! DESIGN
//! ======
//! Storage and timers sit behind traits (`DraftStorage`, `Scheduler`) so the
//! same `DraftStore` runs against browser `localStorage` + `setTimeout` under
//! the `hydrate` feature, against files + tokio natively, and against an
//! in-memory map + virtual clock in tests.

pub mod blog;
pub mod envelope;
pub mod intake;
#[cfg(feature = "hydrate")]
pub mod local_storage;
pub mod schedule;
pub mod schema;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod uploads;

pub use envelope::{ApiEnvelope, SubmitOutcome};
pub use intake::{DropZone, IntakeError, IntakePolicy, MediaKind};
pub use schedule::{CancelHandle, ManualScheduler, Scheduler};
pub use schema::{FieldKind, FieldSpec, FormSchema};
pub use session::{FormError, FormSession, Notice, NoticeLevel, SubmitStatus};
pub use snapshot::{FieldValue, FileRef, Snapshot};
pub use storage::{DraftStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{DraftError, DraftStore, Sanitizer};
pub use uploads::{FileList, ObjectUrls, PreviewUrls};
