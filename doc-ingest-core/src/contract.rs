//! # contract: the document-store API as seen by the pipeline
//!
//! This module defines the [`Uploader`] trait and the plain data types that
//! cross it. The pipeline only ever talks to the remote service through this
//! trait; the concrete HTTP client lives in the CLI crate.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests get a `MockUploader` with
//!   deterministic expectations. Mocks are exported under the
//!   `test-export-mocks` feature for use by dependent crates.
//!
//! ## Error contract
//! - Transport problems (connect, timeout, TLS) are [`UploadError::Network`].
//! - A response outside the accepted status set is [`UploadError::Server`],
//!   carrying the response body as the human-readable reason.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::metadata::Metadata;

/// Everything needed for one multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    /// Local path the content was read from.
    pub path: PathBuf,
    /// Original file name sent in the `file` part.
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
    /// Sent JSON-encoded in the `metadata` part.
    pub metadata: Metadata,
}

impl DocumentUpload {
    pub fn metadata_json(&self) -> Result<String, UploadError> {
        serde_json::to_string(&self.metadata).map_err(|e| UploadError::Decode(e.to_string()))
    }
}

/// What the server answered to an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// A document as listed by the remote library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub chunk_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("could not encode or decode payload: {0}")]
    Decode(String),
}

/// Trait for uploading and managing documents in the remote store.
///
/// Implementors attach the organisation id and bearer credential to every
/// request. Each method performs exactly one request; retries are left to the
/// operator.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload one file plus metadata. Only 200/201 count as success.
    async fn upload_document(&self, req: DocumentUpload) -> Result<UploadReceipt, UploadError>;

    /// List every document in the library.
    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, UploadError>;

    /// Delete a document by id.
    async fn delete_document(&self, document_id: &str) -> Result<(), UploadError>;

    /// Replace the metadata of an existing document.
    async fn update_metadata(
        &self,
        document_id: &str,
        metadata: &Metadata,
    ) -> Result<(), UploadError>;
}
