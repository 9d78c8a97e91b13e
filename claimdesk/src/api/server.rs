//! In-memory claims backend.
//!
//! Serves the same HTTP API the dashboard client talks to, keeping claims,
//! upload records and file bytes in memory. Used for local development and
//! end-to-end tests.
//!
//! # API Endpoints
//!
//! | Method | Path                                                  | Description                 |
//! |--------|-------------------------------------------------------|-----------------------------|
//! | GET    | `/health`                                             | Health check                |
//! | GET    | `/api/v1/claim-links/claim-access/{token}`            | Claim details for a link    |
//! | GET    | `/api/v1/uploads/{role}/claims/{reference_id}/uploads`| Stored documents and media  |
//! | POST   | `/api/v1/uploads/{role}/claims/{reference_id}/documents` | Multipart document upload |
//! | POST   | `/api/v1/uploads/{role}/claims/{reference_id}/media`  | Multipart photo upload      |
//! | GET    | `/files/{id}`                                         | Stored file bytes           |
//! | GET    | `/api/v1/logs`                                        | SSE stream of activity logs |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, log_warning, LOG_BROADCASTER};
use super::types::{error_response, ClaimDetails, DocumentUpload, MediaUpload, UploadReceipt, UploadsData, UploadsEnvelope};
use crate::error::{ServerError, ServerResult};
use crate::models::Role;
use crate::upload::slot::LocalFile;
use crate::upload::submit::UploadMeta;
use crate::upload::validator::validate_parts;

/// Request body cap; a full batch of 5 MiB files fits.
const BODY_LIMIT: usize = 64 * 1024 * 1024;

// =============================================================================
// State
// =============================================================================

/// Everything the backend stores.
#[derive(Debug, Default)]
pub struct AppState {
    /// Claim-link token → claim.
    claims: RwLock<HashMap<String, ClaimDetails>>,
    uploads: RwLock<HashMap<(Role, String), UploadsData>>,
    files: RwLock<HashMap<u64, LocalFile>>,
    next_id: AtomicU64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claims(claims: HashMap<String, ClaimDetails>) -> Self {
        Self { claims: RwLock::new(claims), ..Self::default() }
    }

    pub async fn insert_claim(&self, token: impl Into<String>, claim: ClaimDetails) {
        self.claims.write().await.insert(token.into(), claim);
    }

    pub async fn claim(&self, token: &str) -> ServerResult<ClaimDetails> {
        self.claims
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(format!("claim link {}", token)))
    }

    pub async fn uploads(&self, role: Role, reference_id: &str) -> UploadsData {
        self.uploads
            .read()
            .await
            .get(&(role, reference_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn file(&self, id: u64) -> ServerResult<LocalFile> {
        self.files
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(format!("file {}", id)))
    }

    /// Store the bytes, returning the new file id.
    async fn store_file(&self, file: LocalFile) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.files.write().await.insert(id, file);
        id
    }

    /// Record a documents batch. Every meta entry must carry a `document_type_id`.
    pub async fn store_documents(
        &self,
        role: Role,
        reference_id: &str,
        files: Vec<LocalFile>,
        meta: Vec<UploadMeta>,
    ) -> ServerResult<UploadReceipt> {
        let type_ids = meta
            .iter()
            .map(|m| match m {
                UploadMeta::Document { document_type_id } => Ok(*document_type_id),
                UploadMeta::Media { .. } => Err(ServerError::BadRequest(
                    "documents meta entries need a document_type_id".into(),
                )),
            })
            .collect::<ServerResult<Vec<u32>>>()?;
        check_counts(files.len(), type_ids.len())?;

        let mut records = Vec::with_capacity(files.len());
        for (file, document_type_id) in files.into_iter().zip(type_ids) {
            let file_name = Some(file.name.clone());
            let id = self.store_file(file).await;
            records.push(DocumentUpload { id, document_type_id, file_name, file_url: file_url(id) });
        }

        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        self.uploads
            .write()
            .await
            .entry((role, reference_id.to_string()))
            .or_default()
            .documents
            .extend(records);

        Ok(UploadReceipt { uploaded: ids.len(), ids })
    }

    /// Record a media batch. Every meta entry must carry a `section_id`.
    pub async fn store_media(
        &self,
        role: Role,
        reference_id: &str,
        files: Vec<LocalFile>,
        meta: Vec<UploadMeta>,
    ) -> ServerResult<UploadReceipt> {
        let section_ids = meta
            .iter()
            .map(|m| match m {
                UploadMeta::Media { section_id } => Ok(*section_id),
                UploadMeta::Document { .. } => {
                    Err(ServerError::BadRequest("media meta entries need a section_id".into()))
                }
            })
            .collect::<ServerResult<Vec<u32>>>()?;
        check_counts(files.len(), section_ids.len())?;

        let mut records = Vec::with_capacity(files.len());
        for (file, section_id) in files.into_iter().zip(section_ids) {
            let file_name = Some(file.name.clone());
            let id = self.store_file(file).await;
            records.push(MediaUpload { id, section_id, file_name, file_url: file_url(id) });
        }

        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        self.uploads
            .write()
            .await
            .entry((role, reference_id.to_string()))
            .or_default()
            .media
            .extend(records);

        Ok(UploadReceipt { uploaded: ids.len(), ids })
    }
}

fn check_counts(files: usize, meta: usize) -> ServerResult<()> {
    if files == 0 {
        return Err(ServerError::BadRequest("No files provided".into()));
    }
    if files != meta {
        return Err(ServerError::BadRequest(format!(
            "{} files but {} meta entries",
            files, meta
        )));
    }
    Ok(())
}

fn file_url(id: u64) -> String {
    format!("/files/{}", id)
}

/// Read a claims fixture: a JSON object of claim-link token → claim.
pub fn load_claims(path: &std::path::Path) -> Result<HashMap<String, ClaimDetails>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

// =============================================================================
// Router
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/v1/claim-links/claim-access/{token}", get(claim_access))
        .route("/api/v1/uploads/{role}/claims/{reference_id}/uploads", get(list_uploads))
        .route("/api/v1/uploads/{role}/claims/{reference_id}/documents", post(upload_documents))
        .route("/api/v1/uploads/{role}/claims/{reference_id}/media", post(upload_media))
        .route("/files/{id}", get(download_file))
        .route("/api/v1/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Start the HTTP server
pub async fn start_server(port: u16, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    println!("🚀 Claimdesk server running on http://localhost:{}", port);
    println!("   GET  /api/v1/claim-links/claim-access/{{token}}");
    println!("   GET  /api/v1/uploads/{{role}}/claims/{{reference_id}}/uploads");
    println!("   POST /api/v1/uploads/{{role}}/claims/{{reference_id}}/documents");
    println!("   POST /api/v1/uploads/{{role}}/claims/{{reference_id}}/media");
    println!("   GET  /api/v1/logs   - SSE log stream");
    println!("   GET  /health        - Health check");
    println!();

    serve(listener, state).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "claimdesk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn claim_access(State(state): State<Arc<AppState>>, Path(token): Path<String>) -> ServerResult<Json<ClaimDetails>> {
    let claim = state.claim(&token).await?;
    log_info(format!("Claim link opened for {}", claim.reference_id));
    Ok(Json(claim))
}

fn parse_role(role: &str) -> ServerResult<Role> {
    Role::from_code(role).ok_or_else(|| ServerError::BadRequest(format!("Unknown role: {}", role)))
}

async fn list_uploads(
    State(state): State<Arc<AppState>>,
    Path((role, reference_id)): Path<(String, String)>,
) -> ServerResult<Json<UploadsEnvelope>> {
    let role = parse_role(&role)?;
    let data = state.uploads(role, &reference_id).await;
    Ok(Json(UploadsEnvelope { data }))
}

async fn upload_documents(
    State(state): State<Arc<AppState>>,
    Path((role, reference_id)): Path<(String, String)>,
    multipart: Multipart,
) -> ServerResult<Json<UploadReceipt>> {
    let role = parse_role(&role)?;
    let (files, meta) = read_batch(multipart).await?;
    let receipt = state.store_documents(role, &reference_id, files, meta).await?;
    log_success(format!("Stored {} documents for {}", receipt.uploaded, reference_id));
    Ok(Json(receipt))
}

async fn upload_media(
    State(state): State<Arc<AppState>>,
    Path((role, reference_id)): Path<(String, String)>,
    multipart: Multipart,
) -> ServerResult<Json<UploadReceipt>> {
    let role = parse_role(&role)?;
    let (files, meta) = read_batch(multipart).await?;
    let receipt = state.store_media(role, &reference_id, files, meta).await?;
    log_success(format!("Stored {} media for {}", receipt.uploaded, reference_id));
    Ok(Json(receipt))
}

/// Collect the repeated `files` parts and the `meta` JSON array.
async fn read_batch(mut multipart: Multipart) -> ServerResult<(Vec<LocalFile>, Vec<UploadMeta>)> {
    let mut files = Vec::new();
    let mut meta: Option<Vec<UploadMeta>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;

                validate_parts(bytes.len() as u64, &mime_type).map_err(|e| {
                    log_warning(format!("Rejected {}: {}", file_name, e));
                    ServerError::BadRequest(format!("{}: {}", file_name, e))
                })?;
                files.push(LocalFile::new(file_name, mime_type, bytes.to_vec()));
            }
            "meta" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| ServerError::BadRequest(format!("Invalid meta: {}", e)))?;
                meta = Some(parsed);
            }
            _ => {}
        }
    }

    let meta = meta.ok_or_else(|| ServerError::BadRequest("Missing meta field".into()))?;
    Ok((files, meta))
}

async fn download_file(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ServerResult<impl IntoResponse> {
    let file = state.file(id).await?;
    Ok(([(header::CONTENT_TYPE, file.mime_type)], file.bytes))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> LocalFile {
        LocalFile::new(name, "application/pdf", vec![1, 2])
    }

    #[tokio::test]
    async fn test_store_documents_and_list() {
        let state = AppState::new();
        let receipt = state
            .store_documents(
                Role::Workshop,
                "CLM-1",
                vec![pdf("form.pdf"), pdf("rc.pdf")],
                vec![
                    UploadMeta::Document { document_type_id: 1 },
                    UploadMeta::Document { document_type_id: 3 },
                ],
            )
            .await
            .unwrap();
        assert_eq!(receipt.uploaded, 2);

        let data = state.uploads(Role::Workshop, "CLM-1").await;
        assert_eq!(data.documents[1].document_type_id, 3);
        assert_eq!(data.documents[1].file_url, format!("/files/{}", receipt.ids[1]));
        assert!(state.uploads(Role::Customer, "CLM-1").await.documents.is_empty());

        let stored = state.file(receipt.ids[0]).await.unwrap();
        assert_eq!(stored.name, "form.pdf");
    }

    #[tokio::test]
    async fn test_meta_count_mismatch() {
        let state = AppState::new();
        let err = state
            .store_media(Role::Workshop, "CLM-1", vec![pdf("a.pdf")], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_wrong_meta_kind() {
        let state = AppState::new();
        let err = state
            .store_documents(
                Role::Workshop,
                "CLM-1",
                vec![pdf("a.pdf")],
                vec![UploadMeta::Media { section_id: 2 }],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("document_type_id"));
    }

    #[tokio::test]
    async fn test_unknown_claim() {
        let state = AppState::new();
        assert!(matches!(state.claim("nope").await, Err(ServerError::NotFound(_))));
    }

    #[test]
    fn test_error_status_mapping() {
        let response = ServerError::NotFound("file 9".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = ServerError::BadRequest("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_role_accepts_path_segments_only() {
        assert_eq!(parse_role("claims_handler").unwrap(), Role::ClaimsHandler);
        assert_eq!(parse_role("workshop").unwrap(), Role::Workshop);
        assert!(matches!(parse_role("garage"), Err(ServerError::BadRequest(_))));
        assert!(matches!(parse_role("insured"), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_load_claims_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.json");
        std::fs::write(
            &path,
            r#"{"tok-1": {"reference_id": "CLM-9", "status": "open"}}"#,
        )
        .unwrap();

        let claims = load_claims(&path).unwrap();
        assert_eq!(claims["tok-1"].reference_id, "CLM-9");
    }
}
