//! Immutable ingestion settings shared by every pipeline stage.
//!
//! [`IngestConfig`] is built once at startup and handed to each component by
//! reference. Nothing in here changes after construction.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

const MIB: u64 = 1024 * 1024;

/// Extensions whose content is read as UTF-8 for metadata previews.
pub const TEXTUAL_EXTENSIONS: &[&str] = &[".txt", ".csv"];

/// Default pause between two upload attempts.
pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(2);

/// Maximum number of characters read from a textual file for metadata.
pub const PREVIEW_CHARS: usize = 1000;

/// Maps a lower-cased, dot-prefixed extension to its maximum byte size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedTypePolicy {
    limits: BTreeMap<String, u64>,
}

impl SupportedTypePolicy {
    /// Builds a policy from `(extension, limit)` pairs. Extensions are
    /// normalised to lower case with a leading `.`.
    pub fn from_limits<I, S>(limits: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let limits = limits
            .into_iter()
            .map(|(ext, limit)| (normalise_extension(ext.as_ref()), limit))
            .collect();
        Self { limits }
    }

    /// Size ceiling for `extension`, looked up case-insensitively.
    pub fn limit_for(&self, extension: &str) -> Option<u64> {
        self.limits.get(&normalise_extension(extension)).copied()
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.limit_for(extension).is_some()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.limits.keys().map(String::as_str)
    }
}

impl Default for SupportedTypePolicy {
    fn default() -> Self {
        Self::from_limits([
            (".pdf", 20 * MIB),
            (".doc", 20 * MIB),
            (".docx", 20 * MIB),
            (".xls", 20 * MIB),
            (".xlsx", 20 * MIB),
            (".pages", 20 * MIB),
            (".txt", 2 * MIB),
            (".csv", 2 * MIB),
        ])
    }
}

/// Lower-cases an extension and makes sure it carries exactly one leading dot.
/// An empty input stays empty.
pub fn normalise_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return String::new();
    }
    format!(".{}", trimmed.to_lowercase())
}

pub fn is_textual(extension: &str) -> bool {
    let ext = normalise_extension(extension);
    TEXTUAL_EXTENSIONS.contains(&ext.as_str())
}

/// Everything the pipeline needs to know that is not per-file.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub policy: SupportedTypePolicy,
    /// Fixed pause after every attempted upload.
    pub throttle: Duration,
    pub preview_chars: usize,
}

impl IngestConfig {
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn trace_loaded(&self) {
        info!(
            extensions = self.policy.extensions().count(),
            throttle_ms = self.throttle.as_millis() as u64,
            "Loaded ingest config"
        );
        debug!(?self, "Ingest config loaded (full debug)");
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            policy: SupportedTypePolicy::default(),
            throttle: DEFAULT_THROTTLE,
            preview_chars: PREVIEW_CHARS,
        }
    }
}
