//! Tenant onboarding wizard — document selection, uploads, and resumable
//! progress.
//!
//! The wizard walks a tenant through picking the document types they hold,
//! attaching files for each, and leaving notes. A `WizardController` owns
//! all state; the HTTP routes are a thin adapter over its operations.

pub mod manager;
pub mod model;
pub mod routes;
pub mod state;
pub mod submission;
pub mod upload;

pub use manager::{Handoff, Transition, WizardController, WizardStatus};
pub use model::{AttachedFile, DocumentForm, DocumentOption, DocumentSelection, UploadEntry, WizardSnapshot};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{StepIndicator, StepProgress, StepRules};
pub use submission::{AttachmentSource, SubmissionPart, SubmissionPayload};
pub use upload::{UploadSection, format_file_size, generate_upload_section};
