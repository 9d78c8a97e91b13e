//! HTTP client for the claim-access and uploads API.

use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use super::types::{ClaimDetails, UploadReceipt, UploadsData, UploadsEnvelope};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::Role;
use crate::upload::session::UploadApi;
use crate::upload::submit::UploadBatch;

/// Typed client over one API base URL.
#[derive(Debug, Clone)]
pub struct ClaimsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ClaimsClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ApiError::Request(format!("Invalid API URL '{}': {}", config.api_url, e)))?;
        Ok(Self { http: reqwest::Client::new(), base_url })
    }

    /// Client configured from `CLAIMDESK_API_URL`.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(&ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Request(format!("API URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn uploads_endpoint(&self, role: Role, reference_id: &str, leaf: &str) -> ApiResult<Url> {
        self.endpoint(&["api", "v1", "uploads", role.as_path(), "claims", reference_id, leaf])
    }

    /// `GET /api/v1/claim-links/claim-access/{token}`
    pub async fn claim_access(&self, token: &str) -> ApiResult<ClaimDetails> {
        let url = self.endpoint(&["api", "v1", "claim-links", "claim-access", token])?;
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    /// `GET /api/v1/uploads/{role}/claims/{reference_id}/uploads`
    pub async fn uploads(&self, role: Role, reference_id: &str) -> ApiResult<UploadsData> {
        let url = self.uploads_endpoint(role, reference_id, "uploads")?;
        let response = self.http.get(url).send().await?;
        let envelope: UploadsEnvelope = read_json(response).await?;
        Ok(envelope.data)
    }

    /// `POST .../documents`
    pub async fn upload_documents(&self, role: Role, reference_id: &str, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
        let url = self.uploads_endpoint(role, reference_id, "documents")?;
        self.post_batch(url, batch).await
    }

    /// `POST .../media`
    pub async fn upload_media(&self, role: Role, reference_id: &str, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
        let url = self.uploads_endpoint(role, reference_id, "media")?;
        self.post_batch(url, batch).await
    }

    async fn post_batch(&self, url: Url, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
        let form = batch_form(batch)?;
        let response = self.http.post(url).multipart(form).send().await?;
        read_json(response).await
    }
}

/// One `files` part per file plus the `meta` JSON array.
fn batch_form(batch: &UploadBatch) -> ApiResult<Form> {
    let mut form = Form::new();
    for file in &batch.files {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Multipart(format!("{}: {}", file.name, e)))?;
        form = form.part("files", part);
    }

    let meta = batch.meta_json().map_err(|e| ApiError::Multipart(e.to_string()))?;
    Ok(form.text("meta", meta))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), body });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::InvalidJson(e.to_string()))
}

impl UploadApi for ClaimsClient {
    async fn fetch_uploads(&self, role: Role, reference_id: &str) -> ApiResult<UploadsData> {
        self.uploads(role, reference_id).await
    }

    async fn post_documents(&self, role: Role, reference_id: &str, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
        self.upload_documents(role, reference_id, batch).await
    }

    async fn post_media(&self, role: Role, reference_id: &str, batch: &UploadBatch) -> ApiResult<UploadReceipt> {
        self.upload_media(role, reference_id, batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> ClaimsClient {
        ClaimsClient::new(&ClientConfig::default().with_api_url(url)).unwrap()
    }

    #[test]
    fn test_uploads_endpoint() {
        let url = client("http://localhost:3000")
            .uploads_endpoint(Role::Workshop, "CLM-7", "documents")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v1/uploads/workshop/claims/CLM-7/documents");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes() {
        let url = client("https://claims.example/backend/")
            .endpoint(&["api", "v1", "claim-links", "claim-access", "a b/c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://claims.example/backend/api/v1/claim-links/claim-access/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::default().with_api_url("not a url");
        assert!(matches!(ClaimsClient::new(&config), Err(ApiError::Request(_))));
    }

    #[test]
    fn test_batch_form_rejects_bad_mime() {
        use crate::upload::slot::LocalFile;
        use crate::upload::submit::UploadMeta;

        let mut batch = UploadBatch::default();
        batch.push(LocalFile::new("x", "not a mime", vec![1]), UploadMeta::Media { section_id: 1 });
        assert!(matches!(batch_form(&batch), Err(ApiError::Multipart(_))));
    }
}
