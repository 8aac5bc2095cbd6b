//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STUDYHUB_ADMIN_EMAILS` - Comma-separated admin email allow-list
//!
//! ## Optional
//! - `STUDYHUB_MAX_UPLOAD_BYTES` - Upload size ceiling (default: 2 MiB)

use studyhub_core::Email;

use crate::error::ConfigError;

/// Default upload size ceiling: 2 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// File extensions accepted for uploaded resources.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "mp4", "mov", "avi"];

/// Catalog core configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Static allow-list of admin email addresses.
    pub admin_emails: Vec<Email>,
    /// Hard ceiling on uploaded resource size, in bytes.
    pub max_upload_bytes: u64,
    /// Lowercase file extensions accepted for uploads.
    pub allowed_extensions: Vec<String>,
}

impl CatalogConfig {
    /// Build a configuration with the given admin allow-list and default
    /// upload limits.
    #[must_use]
    pub fn new(admin_emails: Vec<Email>) -> Self {
        Self {
            admin_emails,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `STUDYHUB_ADMIN_EMAILS` is
    /// unset, and `ConfigError::InvalidEnvVar` if any listed email or the
    /// upload ceiling fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("STUDYHUB_ADMIN_EMAILS")
            .map_err(|_| ConfigError::MissingEnvVar("STUDYHUB_ADMIN_EMAILS".to_owned()))?;

        let admin_emails = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Email::parse(s).map_err(|e| {
                    ConfigError::InvalidEnvVar("STUDYHUB_ADMIN_EMAILS".to_owned(), e.to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut config = Self::new(admin_emails);

        if let Ok(raw) = std::env::var("STUDYHUB_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = raw.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    "STUDYHUB_MAX_UPLOAD_BYTES".to_owned(),
                    format!("not a byte count: {raw}"),
                )
            })?;
        }

        Ok(config)
    }

    /// Whether the given lowercase extension is accepted for uploads.
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|e| e == &extension.to_lowercase())
    }
}
