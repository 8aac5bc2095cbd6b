//! Resource validation and the upload gate.
//!
//! Builds [`Resource`] records from form input, enforcing the backing
//! invariant (exactly one of uploaded file or external URL) and the upload
//! limits *before* any byte reaches the storage backend. On a validation
//! failure nothing has been written anywhere.

use chrono::Utc;
use studyhub_core::{CourseId, PrincipalId, Resource, ResourceId, ResourceKind};
use url::Url;

use crate::config::CatalogConfig;
use crate::error::ValidationError;
use crate::ports::storage::FileStorage;

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    fn extension(&self) -> &str {
        self.file_name.rsplit_once('.').map_or("", |(_, ext)| ext)
    }
}

/// Unvalidated resource form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDraft {
    pub kind: ResourceKind,
    pub title: String,
    /// File to upload, if the author chose direct upload.
    pub upload: Option<FilePayload>,
    /// External link, if the author pasted one.
    pub external_url: Option<String>,
}

impl ResourceDraft {
    /// Check the draft against the backing invariant and upload limits.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found;
    /// no remote call has been made when one is returned.
    pub fn validate(&self, config: &CatalogConfig) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        match (&self.upload, &self.external_url) {
            (Some(_), Some(_)) => Err(ValidationError::ConflictingBacking),
            (None, None) => Err(ValidationError::MissingBacking),
            (Some(file), None) => {
                let extension = file.extension().to_lowercase();
                if !config.allows_extension(&extension) {
                    return Err(ValidationError::ExtensionNotAllowed(extension));
                }
                let size = file.bytes.len() as u64;
                if size > config.max_upload_bytes {
                    return Err(ValidationError::FileTooLarge {
                        size,
                        max: config.max_upload_bytes,
                    });
                }
                Ok(())
            }
            (None, Some(url)) => {
                Url::parse(url)?;
                Ok(())
            }
        }
    }

    /// Validate, upload if file-backed, and produce the resource record.
    ///
    /// # Errors
    ///
    /// Returns the validation error, or [`ValidationError::Storage`] if the
    /// upload itself fails after validation passed.
    pub async fn into_resource(
        self,
        storage: &dyn FileStorage,
        config: &CatalogConfig,
        course: &CourseId,
        uploader: PrincipalId,
    ) -> Result<Resource, ValidationError> {
        self.validate(config)?;

        let (url, storage_path, size_bytes) = match (self.upload, self.external_url) {
            (Some(file), None) => {
                let path_hint = format!("courses/{course}/{}", file.file_name);
                let stored = storage.upload(&file.bytes, &path_hint).await?;
                (stored.url, Some(stored.storage_path), Some(stored.size_bytes))
            }
            (None, Some(url)) => (url, None, None),
            // validate() already rejected the other combinations.
            _ => return Err(ValidationError::MissingBacking),
        };

        Ok(Resource {
            id: ResourceId::generate(),
            kind: self.kind,
            title: self.title,
            url,
            storage_path,
            size_bytes,
            mime_type: self.kind.mime_type().to_owned(),
            uploaded_by: uploader,
            created_at: Some(Utc::now()),
        })
    }
}
