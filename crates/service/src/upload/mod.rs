//! Employee creation with attached documents.
//!
//! Each attachment is uploaded and recorded on its own. Under the default
//! fail-open policy a failed attachment is reported and skipped; a
//! fail-closed category aborts the whole creation and undoes what was done.

pub mod policy;
pub mod orchestrator;

pub use orchestrator::{Attachment, UploadError, UploadFailure, UploadOrchestrator, UploadReport, UploadStage};
pub use policy::UploadPolicy;
