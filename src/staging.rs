//! Local artifact reader
//!
//! Downloaded documents are staged on local disk and consumed exactly once:
//! [`read_and_delete`] reads the file, then removes it. Filesystem faults are
//! classified into [`StagingError`] variants that record which step failed.

use crate::error::{FileOperation, StagingError};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use tracing::{debug, error};

/// Text encoding of a staged file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8; invalid sequences are replaced with U+FFFD
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character
    Latin1,
}

impl TextEncoding {
    /// Decode raw bytes into a string
    pub fn decode(&self, bytes: Vec<u8>) -> String {
        match self {
            TextEncoding::Utf8 => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            },
            TextEncoding::Latin1 => bytes.into_iter().map(char::from).collect(),
        }
    }
}

/// Filesystem operations used on staged files
#[async_trait]
pub trait StagingFs: Send + Sync {
    /// Read the whole file
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Remove the file
    async fn remove(&self, path: &Path) -> io::Result<()>;
}

/// [`StagingFs`] backed by `tokio::fs`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioFs;

#[async_trait]
impl StagingFs for TokioFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Read a staged file and delete it
///
/// Deletion is attempted only after a successful read.
pub async fn read_and_delete(
    path: &Path,
    encoding: TextEncoding,
) -> Result<String, StagingError> {
    read_and_delete_with(&TokioFs, path, encoding).await
}

/// [`read_and_delete`] against an explicit filesystem
pub async fn read_and_delete_with(
    fs: &dyn StagingFs,
    path: &Path,
    encoding: TextEncoding,
) -> Result<String, StagingError> {
    debug!(path = %path.display(), "Reading staged file");
    let bytes = fs
        .read(path)
        .await
        .map_err(|e| classify(path, FileOperation::Read, e))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Deleting staged file");
    fs.remove(path)
        .await
        .map_err(|e| classify(path, FileOperation::Delete, e))?;

    Ok(encoding.decode(bytes))
}

fn classify(path: &Path, operation: FileOperation, e: io::Error) -> StagingError {
    let path = path.to_path_buf();
    match e.kind() {
        io::ErrorKind::NotFound => {
            error!(path = %path.display(), %operation, "Staged file not found");
            StagingError::NotFound { path, operation }
        }
        io::ErrorKind::PermissionDenied => {
            error!(path = %path.display(), %operation, "Permission denied on staged file");
            StagingError::PermissionDenied { path, operation }
        }
        _ => {
            error!(path = %path.display(), %operation, error = %e, "Unexpected staging failure");
            StagingError::Io {
                path,
                operation,
                source: e,
            }
        }
    }
}
