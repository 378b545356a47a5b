//! Uploaded file handles supplied by the caller.

use std::path::{Path, PathBuf};

use super::artifact::Sha256Digest;

/// An ephemeral handle to an uploaded file.
///
/// Only the content and the declared digest end up persisted; the handle
/// itself (usually a temp file written by the upload layer) is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    path: PathBuf,
    sha256: Sha256Digest,
    original_filename: Option<String>,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>, sha256: Sha256Digest) -> Self {
        Self {
            path: path.into(),
            sha256,
            original_filename: None,
        }
    }

    pub fn with_original_filename(mut self, filename: impl Into<String>) -> Self {
        self.original_filename = Some(filename.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Digest declared by the uploader (not recomputed).
    pub fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }

    /// Name used when storing the content: the original filename when known,
    /// else the last component of the temp path.
    pub fn filename(&self) -> String {
        self.original_filename
            .clone()
            .or_else(|| {
                self.path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "artifact".to_string())
    }
}
