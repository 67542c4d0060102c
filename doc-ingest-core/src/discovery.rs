//! Recursive enumeration of upload candidates under an ingestion root.

use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::config::{normalise_extension, SupportedTypePolicy};

/// A file found under the ingestion root whose extension is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// Lower-cased with a leading dot, or empty if the file has none.
    pub extension: String,
    pub size: u64,
}

impl FileCandidate {
    /// Reads size and extension for `path` from the filesystem.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        Ok(Self {
            extension: extension_of(&path),
            path,
            size,
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.extension == ".pdf"
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| normalise_extension(&e.to_string_lossy()))
        .unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

/// A restartable view over the supported files below `root`.
///
/// Nothing is read until [`FileDiscovery::iter`] is consumed; every call to
/// `iter` walks the tree again, sorted by file name so that repeated walks of
/// an unchanged tree yield the same sequence.
#[derive(Debug)]
pub struct FileDiscovery<'a> {
    root: PathBuf,
    policy: &'a SupportedTypePolicy,
}

impl<'a> FileDiscovery<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        policy: &'a SupportedTypePolicy,
    ) -> Result<Self, DiscoveryError> {
        let root = root.into();
        if !root.is_dir() {
            error!(root = %root.display(), "Directory not found");
            return Err(DiscoveryError::DirectoryNotFound(root));
        }
        debug!(root = %root.display(), "Scanning directory");
        Ok(Self { root, policy })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = FileCandidate> + 'a {
        let policy = self.policy;
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(move |entry| {
                let extension = extension_of(entry.path());
                if !policy.supports(&extension) {
                    return None;
                }
                match entry.metadata() {
                    Ok(meta) => Some(FileCandidate {
                        path: entry.into_path(),
                        extension,
                        size: meta.len(),
                    }),
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "Could not stat candidate, skipping");
                        None
                    }
                }
            })
    }
}
