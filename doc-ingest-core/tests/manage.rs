use doc_ingest_core::contract::{MockUploader, RemoteDocument, UploadError};
use doc_ingest_core::manage::delete_all_documents;
use std::sync::{Arc, Mutex};

fn doc(id: &str) -> RemoteDocument {
    RemoteDocument {
        id: id.into(),
        ..RemoteDocument::default()
    }
}

#[tokio::test]
async fn test_delete_all_documents_deletes_every_listed_id() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_list_documents()
        .times(1)
        .returning(|| Ok(vec![doc("d1"), doc("d2"), doc("d3")]));

    let deleted = Arc::new(Mutex::new(Vec::new()));
    let seen = deleted.clone();
    uploader
        .expect_delete_document()
        .times(3)
        .returning(move |id: &str| {
            seen.lock().unwrap().push(id.to_string());
            Ok(())
        });

    let report = delete_all_documents(&uploader)
        .await
        .expect("delete all should succeed");

    assert_eq!(report.deleted, vec!["d1", "d2", "d3"]);
    assert!(report.failed.is_empty());
    let mut calls = deleted.lock().unwrap().clone();
    calls.sort();
    assert_eq!(calls, vec!["d1", "d2", "d3"]);
}

#[tokio::test]
async fn test_delete_all_documents_keeps_going_after_a_failed_delete() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_list_documents()
        .returning(|| Ok(vec![doc("keep"), doc("gone")]));
    uploader
        .expect_delete_document()
        .times(2)
        .returning(|id: &str| {
            if id == "keep" {
                Err(UploadError::Server {
                    status: 404,
                    body: "not found".into(),
                })
            } else {
                Ok(())
            }
        });

    let report = delete_all_documents(&uploader).await.unwrap();

    assert_eq!(report.deleted, vec!["gone"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "keep");
}

#[tokio::test]
async fn test_delete_all_documents_surfaces_list_failure() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_list_documents()
        .returning(|| Err(UploadError::Network("connection refused".into())));
    uploader.expect_delete_document().never();

    let err = delete_all_documents(&uploader).await.unwrap_err();
    assert_eq!(err, UploadError::Network("connection refused".into()));
}

use async_trait::async_trait;
use doc_ingest_core::contract::{DocumentUpload, UploadReceipt, Uploader};
use doc_ingest_core::metadata::Metadata;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Library whose deletes take a while and record how many overlap.
#[derive(Default)]
struct SlowLibrary {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    deleted: AtomicUsize,
}

#[async_trait]
impl Uploader for SlowLibrary {
    async fn upload_document(&self, _req: DocumentUpload) -> Result<UploadReceipt, UploadError> {
        unreachable!("not used by delete_all_documents")
    }

    async fn list_documents(&self) -> Result<Vec<RemoteDocument>, UploadError> {
        Ok((0..20).map(|i| doc(&format!("doc-{i}"))).collect())
    }

    async fn delete_document(&self, _document_id: &str) -> Result<(), UploadError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.deleted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_metadata(&self, _id: &str, _metadata: &Metadata) -> Result<(), UploadError> {
        unreachable!("not used by delete_all_documents")
    }
}

#[tokio::test(start_paused = true)]
async fn test_delete_all_documents_sends_one_delete_at_a_time() {
    let library = SlowLibrary::default();

    let report = delete_all_documents(&library).await.unwrap();

    assert_eq!(report.deleted.len(), 20);
    assert_eq!(library.deleted.load(Ordering::SeqCst), 20);
    assert_eq!(library.peak.load(Ordering::SeqCst), 1);
}
