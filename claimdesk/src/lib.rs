//! # Claimdesk - insurance claim dashboard engine
//!
//! The reusable core of a multi-role claims dashboard (auditor, claims
//! handler, customer, workshop): sortable paginated tables over claim
//! records, and the staged upload wizard that collects documents and vehicle
//! photos for a claim.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Rows file  │────▶│   Parser    │────▶│    View     │────▶│  ViewPage   │
//! │ (CSV/JSON)  │     │ (auto-enc)  │     │ filter/sort │     │ (10 / page) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Local files │────▶│  Validator  │────▶│   Wizard    │────▶│ ClaimsClient│
//! │ (5 MiB max) │     │ size / MIME │     │ slots/steps │     │  multipart  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use claimdesk::{ClaimsClient, LocalFile, SlotId, WizardOptions, WorkshopSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClaimsClient::from_env()?;
//!     let mut session = WorkshopSession::new("CLM-2024-0042", WizardOptions::default());
//!     session.hydrate(&client).await?;
//!
//!     let file = LocalFile::read("estimate.pdf".as_ref())?;
//!     if let Some(slot) = session.slot_mut(SlotId::Document(5)) {
//!         slot.add(file)?;
//!     }
//!     while session.next().is_ok() {}
//!     session.confirm(&client).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Constants and environment configuration
//! - [`models`] - Roles, generic records, estimate lines
//! - [`parser`] - CSV/JSON row loading with auto-detection
//! - [`view`] - Search, sort and pagination of collections
//! - [`upload`] - Upload slots, hydration, submission and the wizard
//! - [`lifecycle`] - Teardown of in-flight requests and timers
//! - [`api`] - HTTP client, in-memory server and log stream

// Core modules
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;

// Rows
pub mod parser;
pub mod view;

// Upload wizard
pub mod upload;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ApiError, ApiResult, FileRejection, RowsError, RowsResult, ServerError, ServerResult, SubmitError, WizardError,
    WizardResult,
};

// =============================================================================
// Re-exports - Models & config
// =============================================================================

pub use config::ClientConfig;
pub use models::{bill_total, EstimateLine, Record, Role};

// =============================================================================
// Re-exports - Collection view
// =============================================================================

pub use parser::{load_rows, parse_bytes_auto, parse_json_rows, ParseResult};
pub use view::{
    render_view, PageItem, PageState, RowEvent, SearchFilter, Selection, SortConfig, SortDirection, TableSorts,
    ViewPage, ViewQuery, ViewState,
};

// =============================================================================
// Re-exports - Upload wizard
// =============================================================================

pub use lifecycle::{Cancelled, Lifecycle, LifecycleToken};
pub use upload::{
    map_uploads_to_state, plan_submission, validate_file, CustomerSession, CustomerStep, HydrationReport, LocalFile,
    MediaGroup, PersonalInfo, RemoteFile, SlotId, SubmissionPlan, SubmitOutcome, UploadApi, UploadItem, UploadLayout,
    UploadSession, UploadSlot, Wizard, WizardOptions, WizardStep, WorkshopSession, WorkshopStep,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::{ClaimDetails, ClaimsClient, UploadReceipt, UploadsData};

// Server
pub mod server {
    pub use crate::api::server::{load_claims, router, serve, start_server, AppState};
}
