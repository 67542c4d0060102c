//! Type and size checks applied to each candidate before upload.

use tracing::{debug, error};

use crate::config::SupportedTypePolicy;
use crate::discovery::FileCandidate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported file type: {extension:?}")]
    UnsupportedType { extension: String },
    #[error("file too large ({size} bytes > {limit} bytes)")]
    SizeExceeded { size: u64, limit: u64 },
}

fn mib(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Checks `candidate` against `policy`. The ceiling is inclusive: a file of
/// exactly `limit` bytes passes.
///
/// Only the candidate's recorded extension and size are consulted; the
/// filesystem is not touched.
pub fn validate(
    policy: &SupportedTypePolicy,
    candidate: &FileCandidate,
) -> Result<(), ValidationError> {
    let Some(limit) = policy.limit_for(&candidate.extension) else {
        error!(
            path = %candidate.path.display(),
            extension = %candidate.extension,
            "Unsupported file type"
        );
        return Err(ValidationError::UnsupportedType {
            extension: candidate.extension.clone(),
        });
    };

    debug!(
        path = %candidate.path.display(),
        size = %mib(candidate.size),
        limit = %mib(limit),
        "Checking file size"
    );

    if candidate.size > limit {
        error!(
            path = %candidate.path.display(),
            size = %mib(candidate.size),
            limit = %mib(limit),
            "File too large"
        );
        return Err(ValidationError::SizeExceeded {
            size: candidate.size,
            limit,
        });
    }

    Ok(())
}
