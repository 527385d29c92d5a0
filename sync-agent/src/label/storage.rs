//! Label storage boundary
//!
//! Downloaded documents are persisted outside the process; the workflow only
//! sees an opaque reference string it can write back to the ledger.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Label storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("Label storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary to wherever finished labels live
#[async_trait]
pub trait LabelStorage: Send + Sync {
    /// Persist the document bytes, returning a stable reference to them
    async fn store(&self, order_sn: &str, bytes: &[u8]) -> Result<String, StorageError>;
}

/// Filesystem-backed label storage
///
/// Writes `label_{order_sn}.pdf` under a fixed directory, creating the
/// directory on first use. The returned reference is the file path.
pub struct LocalLabelStorage {
    dir: PathBuf,
}

impl LocalLabelStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LabelStorage for LocalLabelStorage {
    async fn store(&self, order_sn: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("label_{order_sn}.pdf"));
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(order_sn, path = %path.display(), size = bytes.len(), "Stored label");
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_writes_pdf_under_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalLabelStorage::new(tmp.path().join("labels"));

        let reference = storage.store("X001", b"%PDF-1.4 test").await.unwrap();
        assert!(reference.ends_with("label_X001.pdf"));

        let bytes = std::fs::read(&reference).unwrap();
        assert_eq!(bytes, b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalLabelStorage::new(tmp.path());

        storage.store("X001", b"old").await.unwrap();
        let reference = storage.store("X001", b"new").await.unwrap();
        assert_eq!(std::fs::read(&reference).unwrap(), b"new");
    }
}
