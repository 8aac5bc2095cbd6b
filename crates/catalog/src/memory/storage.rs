//! In-memory file storage.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::ports::storage::{FileStorage, StoredFile};

/// In-memory [`FileStorage`] recording uploaded paths.
#[derive(Default)]
pub struct MemoryStorage {
    uploads: Mutex<Vec<(String, u64)>>,
    fail: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty storage backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent uploads fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Paths and sizes of every recorded upload, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, u64)> {
        self.uploads.lock().expect("uploads lock").clone()
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn upload(&self, bytes: &[u8], path_hint: &str) -> Result<StoredFile, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("storage offline".to_owned()));
        }
        let size_bytes = bytes.len() as u64;
        self.uploads
            .lock()
            .expect("uploads lock")
            .push((path_hint.to_owned(), size_bytes));
        Ok(StoredFile {
            url: format!("https://storage.studyhub.test/{path_hint}"),
            storage_path: path_hint.to_owned(),
            size_bytes,
        })
    }
}
