//! Status and classification enums for courses and sessions.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a course.
///
/// Courses are created in `Draft` by their author and published one-way;
/// there is no unpublish path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

impl CourseStatus {
    /// Whether transitioning from `self` to `next` is allowed.
    ///
    /// The only legal transition is `Draft -> Published`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Draft, Self::Published))
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(format!("invalid course status: {s}")),
        }
    }
}

/// Pedagogical type of a course.
///
/// Serialized in the uppercase form the catalog documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseType {
    #[serde(rename = "TD")]
    Td,
    #[serde(rename = "TP")]
    Tp,
    #[serde(rename = "COUR")]
    Cour,
}

impl std::fmt::Display for CourseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Td => write!(f, "TD"),
            Self::Tp => write!(f, "TP"),
            Self::Cour => write!(f, "COUR"),
        }
    }
}

impl std::str::FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TD" => Ok(Self::Td),
            "TP" => Ok(Self::Tp),
            "COUR" => Ok(Self::Cour),
            _ => Err(format!("invalid course type: {s}")),
        }
    }
}

/// Kind of learning resource attached to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Pdf,
    Video,
}

impl ResourceKind {
    /// The mime type recorded on resources of this kind.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Video => "video/mp4",
        }
    }
}

/// Coarse authorization tag for a signed-in principal.
///
/// Derived from the principal's email against the static admin allow-list;
/// never stored independently. Admins have no profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Student => write!(f, "student"),
        }
    }
}
