//! The file storage contract.
//!
//! Used only by the resource-attachment flow. Size and extension limits
//! are enforced by [`crate::upload_gate`] before `upload` is ever called.

use async_trait::async_trait;

use crate::error::StorageError;

/// A successfully stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Public URL serving the file.
    pub url: String,
    /// Backend storage path, kept on the resource record.
    pub storage_path: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
}

/// The external file storage backend.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Upload a file under the given path hint.
    async fn upload(&self, bytes: &[u8], path_hint: &str) -> Result<StoredFile, StorageError>;
}
