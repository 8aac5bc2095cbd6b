//! The course record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{CourseId, PrincipalId};
use crate::types::price::Price;
use crate::types::resource::Resource;
use crate::types::status::{CourseStatus, CourseType};

/// A course as stored in the `courses` collection.
///
/// Field names mirror the store documents (camelCase). Optional fields are
/// default-filled on deserialization so a partially-written document never
/// takes the catalog down; documents missing a required field (id, title,
/// type, author) are rejected at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Stable ID, assigned by the caller at creation time.
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Pedagogical type (TD, TP or COUR).
    #[serde(rename = "type")]
    pub course_type: CourseType,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub category: String,
    /// Thumbnail image reference, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Ordered resource sequence, co-owned by the course.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Principal ID of the authoring admin.
    pub created_by: PrincipalId,
    /// Stamped by the repository when the course is created; absent only
    /// on documents written before that or on unsaved drafts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Whether the given principal authored this course.
    #[must_use]
    pub fn is_authored_by(&self, principal: &PrincipalId) -> bool {
        &self.created_by == principal
    }

    /// Case-insensitive substring match against the course title.
    #[must_use]
    pub fn title_matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.to_lowercase())
    }
}
