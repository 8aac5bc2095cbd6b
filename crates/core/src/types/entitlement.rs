//! Purchase entitlement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{CourseId, PrincipalId};

/// A fact "principal P has acquired course C", stored in the `purchases`
/// collection and keyed by (user, course).
///
/// Read-only from this codebase's perspective: the write path is payment,
/// which is out of scope. Records are additive only; absence means no
/// access unless the course is free or authored by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub user_id: PrincipalId,
    pub course_id: CourseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<DateTime<Utc>>,
}
