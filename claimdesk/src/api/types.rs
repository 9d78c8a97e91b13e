//! Wire types of the claim-access and uploads API.
//!
//! Field names follow the backend's snake_case JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// =============================================================================
// Claim Access
// =============================================================================

/// Response of `GET /api/v1/claim-links/claim-access/{token}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDetails {
    pub reference_id: String,
    pub status: String,
    #[serde(default)]
    pub policy: Option<PolicyInfo>,
    #[serde(default)]
    pub insurer: Option<InsurerInfo>,
    #[serde(default)]
    pub workshop: Option<WorkshopInfo>,
    #[serde(default)]
    pub allocation: Option<AllocationInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInfo {
    pub policy_number: String,
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurerInfo {
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopInfo {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInfo {
    #[serde(default)]
    pub surveyor: Option<String>,
    #[serde(default)]
    pub allocated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Uploads
// =============================================================================

/// A stored document, keyed by `document_type_id` (1-based slot position).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub id: u64,
    pub document_type_id: u32,
    #[serde(default)]
    pub file_name: Option<String>,
    pub file_url: String,
}

/// A stored photo, keyed by `section_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub id: u64,
    pub section_id: u32,
    #[serde(default)]
    pub file_name: Option<String>,
    pub file_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadsData {
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
    #[serde(default)]
    pub media: Vec<MediaUpload>,
}

/// Response of `GET .../uploads`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadsEnvelope {
    pub data: UploadsData,
}

/// Response of the documents / media POSTs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub uploaded: usize,
    pub ids: Vec<u64>,
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
