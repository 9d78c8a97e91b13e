//! Error types for the claim dashboard engine.
//!
//! - [`FileRejection`] - Client-side file validation failures
//! - [`WizardError`] - Illegal or gated wizard transitions
//! - [`ApiError`] - Claim-access / uploads HTTP failures
//! - [`SubmitError`] - Two-phase upload submission failures
//! - [`RowsError`] - Loading collection rows from CSV or JSON
//! - [`ServerError`] - Mock backend request failures
//!
//! Conversions are provided via `From` so `?` works across boundaries.

use thiserror::Error;

// =============================================================================
// File Validation Errors
// =============================================================================

/// Reasons a file is refused by an upload slot.
///
/// The display strings are shown next to the slot, so they stay short.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
    /// File is larger than [`crate::config::MAX_FILE_SIZE`].
    #[error("File size exceeds 5MB limit")]
    TooLarge { size: u64 },

    /// MIME type outside [`crate::config::ACCEPTED_MIME_TYPES`].
    #[error("Only JPEG, PNG, GIF and PDF files are allowed")]
    UnsupportedType { mime_type: String },
}

// =============================================================================
// Wizard Errors
// =============================================================================

/// Errors raised by the wizard step controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// A required text field is blank.
    #[error("{field} is required")]
    MissingField { field: String },

    /// A required upload slot has no files.
    #[error("Please upload {0}")]
    RequiredSlotEmpty(String),

    /// Edit jumps are only offered on the review step.
    #[error("Edit is only available from the review step")]
    NotOnReviewStep,

    /// Edit jumps only go backwards.
    #[error("Cannot jump from step {from} to step {to}")]
    InvalidJump { from: u8, to: u8 },

    /// `Next` on the final step; the review step only confirms.
    #[error("Already on the last step")]
    NoNextStep,

    /// Confirm outside of the final step.
    #[error("Confirm is only available on the final step")]
    NotFinalStep,

    /// The wizard was already submitted.
    #[error("Wizard has already been submitted")]
    Completed,
}

// =============================================================================
// HTTP Client Errors
// =============================================================================

/// Errors from the claim-access / uploads API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, DNS, ...).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Non-2xx response.
    #[error("Server error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// Multipart body could not be assembled.
    #[error("Failed to build multipart body: {0}")]
    Multipart(String),

    /// The owning lifecycle was torn down while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidJson(err.to_string())
        } else {
            ApiError::Request(err.to_string())
        }
    }
}

// =============================================================================
// Submission Errors
// =============================================================================

/// Errors from confirming an upload session.
///
/// Documents are posted before media; a [`SubmitError::Media`] therefore
/// means the documents batch already landed on the server.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Confirm was refused by the wizard.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// The documents POST failed; media was not attempted.
    #[error("Document upload failed: {0}")]
    Documents(ApiError),

    /// The media POST failed after documents succeeded.
    #[error("Media upload failed: {0}")]
    Media(ApiError),
}

impl SubmitError {
    /// True when the failure was caused by lifecycle teardown.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            SubmitError::Documents(ApiError::Cancelled) | SubmitError::Media(ApiError::Cancelled)
        )
    }
}

// =============================================================================
// Row Loading Errors
// =============================================================================

/// Errors while loading collection rows from disk.
#[derive(Debug, Error)]
pub enum RowsError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// Malformed JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON input was not an array of objects.
    #[error("Expected an array of objects, found {0}")]
    NotRecords(String),

    /// Empty file.
    #[error("File is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Server Errors
// =============================================================================

/// Mock backend errors, mapped to HTTP statuses in [`crate::api::server`].
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unknown token, reference or file.
    #[error("Not found: {0}")]
    NotFound(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for HTTP client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for wizard transitions.
pub type WizardResult<T> = Result<T, WizardError>;

/// Result type for row loading.
pub type RowsResult<T> = Result<T, RowsError>;

/// Result type for server handlers.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_are_short() {
        let err = FileRejection::TooLarge { size: 6 * 1024 * 1024 };
        assert!(err.to_string().contains("exceeds 5MB"));

        let err = FileRejection::UnsupportedType { mime_type: "text/plain".into() };
        assert!(err.to_string().contains("PDF"));
    }

    #[test]
    fn test_wizard_error_converts_to_submit_error() {
        let err: SubmitError = WizardError::MissingField { field: "First name".into() }.into();
        assert_eq!(err.to_string(), "First name is required");
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_detection() {
        assert!(SubmitError::Documents(ApiError::Cancelled).is_cancelled());
        assert!(SubmitError::Media(ApiError::Cancelled).is_cancelled());
        let status = ApiError::Status { status: 500, body: "boom".into() };
        assert!(!SubmitError::Media(status).is_cancelled());
    }
}
