//! High-level pipeline: discover → (PDF to text) → validate → metadata → upload.
//!
//! [`BatchOrchestrator::run`] walks an ingestion root and pushes every
//! supported file through the stages one at a time, pausing for a fixed
//! interval after each upload attempt.
//!
//! # Failure policy
//! Isolate and continue. A failing stage records the file as failed in the
//! [`BatchReport`] and the loop moves on to the next candidate. Only a missing
//! root directory ends the run early, and then with an empty report.
//!
//! # Cancellation
//! An optional `watch` channel signals shutdown. It is checked before each
//! candidate and cuts the throttle pause short; work already done is kept and
//! nothing is rolled back.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::contract::{DocumentUpload, UploadError, Uploader};
use crate::discovery::{FileCandidate, FileDiscovery};
use crate::metadata::MetadataGenerator;
use crate::pdf_text::{ExtractionError, PdfTextExtractor};
use crate::validate::{validate, ValidationError};

/// Why a single file did not make it to the remote store.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("file not found: {0}")]
    Missing(PathBuf),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Result of pushing one candidate through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub path: PathBuf,
    pub succeeded: bool,
    /// Present iff `succeeded` is false.
    pub reason: Option<String>,
}

impl UploadOutcome {
    pub fn success(path: PathBuf) -> Self {
        Self {
            path,
            succeeded: true,
            reason: None,
        }
    }

    pub fn failure(path: PathBuf, error: &StageError) -> Self {
        Self {
            path,
            succeeded: false,
            reason: Some(error.to_string()),
        }
    }
}

/// Per-run summary. Printed or logged, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<PathBuf>,
    pub outcomes: Vec<UploadOutcome>,
    /// Set when a shutdown signal stopped the run before every candidate was
    /// processed.
    pub interrupted: bool,
}

impl BatchReport {
    fn record(&mut self, outcome: UploadOutcome) {
        if outcome.succeeded {
            self.succeeded += 1;
        } else {
            self.failed.push(outcome.path.clone());
        }
        self.outcomes.push(outcome);
    }

    pub fn trace_summary(&self) {
        info!(
            total = self.total,
            succeeded = self.succeeded,
            failed = self.failed.len(),
            interrupted = self.interrupted,
            "Processing summary"
        );
        for outcome in self.outcomes.iter().filter(|o| !o.succeeded) {
            info!(
                path = %outcome.path.display(),
                reason = outcome.reason.as_deref().unwrap_or(""),
                "Failed upload"
            );
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processing Summary:")?;
        writeln!(f, "Total files processed: {}", self.total)?;
        writeln!(f, "Successfully uploaded: {}", self.succeeded)?;
        writeln!(f, "Failed uploads: {}", self.failed.len())?;
        if self.interrupted {
            writeln!(f, "Run interrupted before all files were processed")?;
        }
        if !self.failed.is_empty() {
            writeln!(f, "\nFailed uploads:")?;
            for path in &self.failed {
                writeln!(f, "{}", path.display())?;
            }
        }
        Ok(())
    }
}

/// Sequences every stage for each candidate and owns the batch report.
pub struct BatchOrchestrator<'a, U: Uploader + ?Sized> {
    config: &'a IngestConfig,
    uploader: &'a U,
    extractor: PdfTextExtractor,
    metadata: MetadataGenerator,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<'a, U: Uploader + ?Sized> BatchOrchestrator<'a, U> {
    pub fn new(config: &'a IngestConfig, uploader: &'a U) -> Self {
        Self {
            config,
            uploader,
            extractor: PdfTextExtractor::new(),
            metadata: MetadataGenerator::new(config.preview_chars),
            shutdown: None,
        }
    }

    /// Stop the run once `true` is sent on this channel.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Processes every supported file under `root` exactly once.
    pub async fn run(&self, root: &Path) -> BatchReport {
        info!(root = %root.display(), "Starting batch ingestion");
        let mut report = BatchReport::default();

        let discovery = match FileDiscovery::new(root, &self.config.policy) {
            Ok(discovery) => discovery,
            Err(e) => {
                error!(error = %e, "Aborting batch");
                return report;
            }
        };

        // Collected up front so text artifacts written during the run are not
        // picked up as new candidates.
        let candidates: Vec<FileCandidate> = discovery.iter().collect();
        report.total = candidates.len();
        if candidates.is_empty() {
            warn!(root = %root.display(), "No supported files found in the directory");
            return report;
        }
        info!(total = report.total, "Found supported files to process");

        for (index, candidate) in candidates.iter().enumerate() {
            if self.shutdown_requested() {
                warn!(
                    processed = index,
                    total = report.total,
                    "Shutdown requested, stopping before next file"
                );
                report.interrupted = true;
                break;
            }
            info!(
                index = index + 1,
                total = report.total,
                path = %candidate.path.display(),
                "Processing file"
            );
            let outcome = self.process(candidate).await;
            report.record(outcome);
        }

        report.trace_summary();
        report
    }

    /// Pushes a single file through the same stages as [`run`](Self::run),
    /// without discovery or a throttle pause afterwards.
    pub async fn upload_one(&self, path: &Path) -> UploadOutcome {
        info!(path = %path.display(), "Processing single file");
        let candidate = match FileCandidate::from_path(path) {
            Ok(candidate) => candidate,
            Err(e) => {
                error!(path = %path.display(), error = %e, "File not found");
                return UploadOutcome::failure(
                    path.to_path_buf(),
                    &StageError::Missing(path.to_path_buf()),
                );
            }
        };
        let (outcome, _) = self.attempt(&candidate).await;
        outcome
    }

    async fn process(&self, candidate: &FileCandidate) -> UploadOutcome {
        let (outcome, uploaded) = self.attempt(candidate).await;
        if uploaded {
            self.pause().await;
        }
        outcome
    }

    /// Returns the outcome and whether the network call was made.
    async fn attempt(&self, candidate: &FileCandidate) -> (UploadOutcome, bool) {
        let upload = match self.prepare(candidate) {
            Ok(upload) => upload,
            Err((path, e)) => {
                error!(path = %path.display(), error = %e, "File failed before upload");
                return (UploadOutcome::failure(path, &e), false);
            }
        };

        let path = upload.path.clone();
        let outcome = match self.uploader.upload_document(upload).await {
            Ok(receipt) => {
                info!(path = %path.display(), status = receipt.status, "Successfully uploaded");
                UploadOutcome::success(path)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to upload");
                UploadOutcome::failure(path, &StageError::Upload(e))
            }
        };
        (outcome, true)
    }

    /// Everything up to the network call. On failure returns the path to
    /// report along with the reason.
    fn prepare(&self, candidate: &FileCandidate) -> Result<DocumentUpload, (PathBuf, StageError)> {
        let unit = if candidate.is_pdf() {
            let artifact = self
                .extractor
                .extract(&candidate.path)
                .map_err(|e| (candidate.path.clone(), StageError::from(e)))?;
            FileCandidate::from_path(&artifact)
                .map_err(|_| (artifact.clone(), StageError::Missing(artifact.clone())))?
        } else {
            if !candidate.path.exists() {
                return Err((
                    candidate.path.clone(),
                    StageError::Missing(candidate.path.clone()),
                ));
            }
            candidate.clone()
        };

        validate(&self.config.policy, &unit).map_err(|e| (unit.path.clone(), StageError::from(e)))?;

        let metadata = self.metadata.generate(&unit);

        let content = std::fs::read(&unit.path).map_err(|e| {
            (
                unit.path.clone(),
                StageError::Read {
                    path: unit.path.clone(),
                    source: e,
                },
            )
        })?;

        let mime_type = mime_guess::from_path(&unit.path)
            .first_or_octet_stream()
            .to_string();
        debug!(path = %unit.path.display(), mime = %mime_type, size = content.len(), "Prepared upload");

        Ok(DocumentUpload {
            file_name: unit.file_name(),
            path: unit.path,
            mime_type,
            content,
            metadata,
        })
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    /// Fixed-rate throttle between upload attempts.
    async fn pause(&self) {
        let sleep = tokio::time::sleep(self.config.throttle);
        match self.shutdown.clone() {
            Some(mut rx) => {
                tokio::select! {
                    _ = sleep => {}
                    Ok(_) = rx.wait_for(|stop| *stop) => {
                        debug!("Throttle pause cut short by shutdown");
                    }
                }
            }
            None => sleep.await,
        }
    }
}
