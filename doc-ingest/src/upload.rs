#![doc = "HTTP implementation of the core `Uploader` contract against the CodeGPT document API."]
//
//! # Document API client
//!
//! [`DocumentApiClient`] wires the [`Uploader`] trait from `doc-ingest-core`
//! to the remote service with `reqwest`.
//!
//! - Construct it from an [`ApiConfig`] (see `load_config`).
//! - Every request carries `accept: application/json`, the organisation id
//!   header and a bearer token.
//! - Status codes are mapped to [`UploadError::Server`] with the response body
//!   as the reason; transport failures (including timeouts) become
//!   [`UploadError::Network`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};

pub use doc_ingest_core::contract::{
    DocumentUpload, RemoteDocument, UploadError, UploadReceipt, Uploader,
};
use doc_ingest_core::metadata::Metadata;

use crate::load_config::ApiConfig;

/// Header carrying the organisation id on every request.
pub const ORG_HEADER: &str = "CodeGPT-Org-Id";

pub struct DocumentApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl DocumentApiClient {
    pub fn new(api: &ApiConfig) -> Result<Self, UploadError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let org_header = HeaderName::from_bytes(ORG_HEADER.as_bytes())
            .map_err(|e| UploadError::Decode(format!("invalid header name: {e}")))?;
        headers.insert(org_header, header_value(&api.organization_id)?);
        let mut auth = header_value(&format!("Bearer {}", api.api_key))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = api.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            tracing::error!(error = ?e, "Failed to build HTTP client");
            UploadError::Network(e.to_string())
        })?;

        tracing::info!(
            base_url = %api.base_url,
            api_key_set = !api.api_key.is_empty(),
            "Initialized DocumentApiClient"
        );
        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, UploadError> {
    HeaderValue::from_str(value)
        .map_err(|e| UploadError::Decode(format!("invalid header value: {e}")))
}

fn network(e: reqwest::Error) -> UploadError {
    UploadError::Network(e.to_string())
}

/// Reads the body and returns it if the status is one of `accepted`.
async fn expect_status(response: Response, accepted: &[StatusCode]) -> Result<String, UploadError> {
    let status = response.status();
    let body = response.text().await.map_err(network)?;
    tracing::debug!(status = status.as_u16(), body = %body, "Response received");
    if accepted.contains(&status) {
        Ok(body)
    } else {
        Err(UploadError::Server {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Uploader for DocumentApiClient {
    async fn upload_document(&self, req: DocumentUpload) -> Result<UploadReceipt, UploadError> {
        let url = self.endpoint("document");
        tracing::debug!(url = %url, path = %req.path.display(), "Attempting upload");

        let metadata = req.metadata_json()?;
        let file_part = Part::bytes(req.content)
            .file_name(req.file_name.clone())
            .mime_str(&req.mime_type)
            .map_err(|e| UploadError::Decode(format!("mime: {e}")))?;
        let form = Form::new()
            .part("file", file_part)
            .text("metadata", metadata);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, file = %req.file_name, "Upload request failed");
                network(e)
            })?;

        let status = response.status().as_u16();
        let body = expect_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        tracing::info!(file = %req.file_name, status, "Document accepted by server");
        Ok(UploadReceipt { status, body })
    }

    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, UploadError> {
        tracing::info!("Fetching document list");
        let response = self
            .http
            .get(self.endpoint("document"))
            .send()
            .await
            .map_err(network)?;
        let body = expect_status(response, &[StatusCode::OK]).await?;
        let documents: Vec<RemoteDocument> =
            serde_json::from_str(&body).map_err(|e| UploadError::Decode(e.to_string()))?;
        tracing::info!(count = documents.len(), "Retrieved documents");
        Ok(documents)
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), UploadError> {
        tracing::info!(document_id, "Deleting document");
        let response = self
            .http
            .delete(self.endpoint(&format!("document/{document_id}")))
            .send()
            .await
            .map_err(network)?;
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;
        Ok(())
    }

    async fn update_metadata(
        &self,
        document_id: &str,
        metadata: &Metadata,
    ) -> Result<(), UploadError> {
        tracing::info!(document_id, "Updating document metadata");
        let response = self
            .http
            .patch(self.endpoint(&format!("document/{document_id}/metadata")))
            .json(metadata)
            .send()
            .await
            .map_err(network)?;
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;
        Ok(())
    }
}
