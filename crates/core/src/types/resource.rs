//! Learning resources attached to a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{PrincipalId, ResourceId};
use crate::types::status::ResourceKind;

/// A document or video attached to a course.
///
/// A resource is backed by exactly one of an uploaded file (in which case
/// `storage_path` and `size_bytes` are present) or an externally supplied
/// link (in which case they are absent). The constructor invariant is
/// enforced by the catalog crate's validation before any write; the record
/// itself stays a plain data carrier so store snapshots round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub title: String,
    /// Either the uploaded file's public URL or the external link.
    pub url: String,
    /// Present only for uploaded files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Present only for uploaded files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub mime_type: String,
    pub uploaded_by: PrincipalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Whether this resource is backed by an uploaded file rather than an
    /// external link.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        self.storage_path.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_external_link_round_trip() {
        let resource = Resource {
            id: ResourceId::new("r-1"),
            kind: ResourceKind::Video,
            title: "Intro".to_owned(),
            url: "https://videos.example.com/intro".to_owned(),
            storage_path: None,
            size_bytes: None,
            mime_type: ResourceKind::Video.mime_type().to_owned(),
            uploaded_by: PrincipalId::new("admin-1"),
            created_at: None,
        };
        assert!(!resource.is_uploaded());

        let json = serde_json::to_value(&resource).unwrap();
        assert!(json.get("storagePath").is_none());
        let back: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_uploaded_file() {
        let doc = serde_json::json!({
            "id": "r-2",
            "type": "pdf",
            "title": "Notes",
            "url": "https://storage.example.com/courses/c1/notes.pdf",
            "storagePath": "courses/c1/notes.pdf",
            "sizeBytes": 1024,
            "mimeType": "application/pdf",
            "uploadedBy": "admin-1"
        });
        let resource: Resource = serde_json::from_value(doc).unwrap();
        assert!(resource.is_uploaded());
        assert_eq!(resource.size_bytes, Some(1024));
    }
}
