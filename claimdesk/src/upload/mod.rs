//! Staged file-upload wizard.
//!
//! - [`validator`] - Size and MIME checks applied when a file is added
//! - [`slot`] - Upload slots holding local or server-side files
//! - [`layout`] - The fixed document and media slot layout
//! - [`hydrate`] - Placing fetched uploads into the layout
//! - [`submit`] - Splitting new files into the two upload batches
//! - [`wizard`] - Per-role step controller and success countdown
//! - [`session`] - Wizard, slots and HTTP side effects for one claim

pub mod hydrate;
pub mod layout;
pub mod session;
pub mod slot;
pub mod submit;
pub mod validator;
pub mod wizard;

pub use hydrate::{map_uploads_to_state, DroppedUpload, HydrationReport};
pub use layout::{MediaGroup, SlotId, UploadLayout, DOCUMENT_TYPES};
pub use session::{CustomerSession, SubmitOutcome, UploadApi, UploadSession, WorkshopSession};
pub use slot::{LocalFile, RemoteFile, UploadItem, UploadSlot};
pub use submit::{plan_submission, SubmissionPlan, UploadBatch, UploadMeta};
pub use validator::{mime_from_path, validate_file};
pub use wizard::{
    step_from_url, url_with_step, CountdownTick, CustomerStep, PersonalInfo, Phase, StepGate, SuccessCountdown,
    Transition, Wizard, WizardOptions, WizardStep, WorkshopStep,
};
