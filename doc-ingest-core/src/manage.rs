//! Helpers over the remote document library that go beyond a single request.

use std::fmt;
use tracing::{error, info};

use crate::contract::{RemoteDocument, UploadError, Uploader};

/// Outcome of [`delete_all_documents`].
#[derive(Debug, Default)]
pub struct DeleteAllReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, UploadError)>,
}

/// Lists the library and deletes every document in it, one request at a
/// time. A failed delete does not stop the others; listing failure is
/// returned as an error.
pub async fn delete_all_documents<C>(client: &C) -> Result<DeleteAllReport, UploadError>
where
    C: Uploader + ?Sized,
{
    let documents = client.list_documents().await?;
    info!(count = documents.len(), "Deleting all documents");

    let mut report = DeleteAllReport::default();
    for id in documents.into_iter().map(|d| d.id) {
        match client.delete_document(&id).await {
            Ok(()) => {
                info!(document_id = %id, "Deleted document");
                report.deleted.push(id);
            }
            Err(e) => {
                error!(document_id = %id, error = %e, "Failed to delete document");
                report.failed.push((id, e));
            }
        }
    }
    Ok(report)
}

/// Human-readable block describing one listed document.
pub fn describe_document(document: &RemoteDocument) -> String {
    DocumentListing(document).to_string()
}

struct DocumentListing<'a>(&'a RemoteDocument);

impl fmt::Display for DocumentListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_na(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("N/A")
        }
        fn num_or_na(value: Option<u64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".into())
        }

        let document = self.0;
        writeln!(f, "Document Information:")?;
        writeln!(f, "ID: {}", document.id)?;
        writeln!(f, "Name: {}", or_na(&document.name))?;
        writeln!(f, "Created: {}", or_na(&document.created_at))?;
        writeln!(f, "File Type: {}", or_na(&document.file_type))?;
        writeln!(f, "\nMetadata:")?;
        for (key, value) in &document.metadata {
            match value {
                serde_json::Value::String(s) => writeln!(f, "  {key}: {s}")?,
                other => writeln!(f, "  {key}: {other}")?,
            }
        }
        writeln!(f, "\nTokens: {}", num_or_na(document.tokens))?;
        writeln!(f, "Chunk Count: {}", num_or_na(document.chunk_count))?;
        write!(f, "{}", "-".repeat(50))
    }
}
