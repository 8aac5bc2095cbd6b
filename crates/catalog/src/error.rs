//! Error types for the catalog core.
//!
//! Remote failures are caught at the port boundary, logged, and converted
//! to safe defaults (empty list, `None` profile, failed
//! [`studyhub_core::Outcome`]); they never cross into the presentation
//! layer as unhandled failures. Validation errors are detected before any
//! remote call.

use thiserror::Error;

/// Errors surfaced by the remote document store.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The store could not be reached or the request failed in transit.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection the write targeted.
        collection: String,
        /// Document id the write targeted.
        id: String,
    },

    /// A stored document did not match the expected record shape.
    #[error("malformed document in {collection}: {reason}")]
    Malformed {
        /// Collection the document came from.
        collection: String,
        /// Deserialization failure description.
        reason: String,
    },
}

/// Errors surfaced by the file storage backend.
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    /// The upload failed in transit or was rejected by the backend.
    #[error("upload failed: {0}")]
    UploadFailed(String),
}

/// Validation failures detected before any remote call.
///
/// These are user-facing: no partial state has been written when one is
/// returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The file extension is not in the allow-list.
    #[error("file type .{0} is not allowed (pdf, mp4, mov, avi)")]
    ExtensionNotAllowed(String),

    /// The file exceeds the upload size ceiling.
    #[error("file is {size} bytes, maximum is {max}")]
    FileTooLarge {
        /// Size of the rejected file.
        size: u64,
        /// Configured ceiling.
        max: u64,
    },

    /// The external link could not be parsed as a URL.
    #[error("invalid resource URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A resource needs exactly one backing; both a file and a URL were given.
    #[error("a resource cannot have both an uploaded file and an external URL")]
    ConflictingBacking,

    /// A resource needs exactly one backing; neither was given.
    #[error("a resource needs either an uploaded file or an external URL")]
    MissingBacking,

    /// The requested status change is not a legal transition.
    #[error("cannot change course status from {from} to {to}")]
    IllegalStatusTransition {
        /// Current status.
        from: studyhub_core::CourseStatus,
        /// Requested status.
        to: studyhub_core::CourseStatus,
    },

    /// The upload itself failed after validation passed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}
