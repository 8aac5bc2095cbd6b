//! Uniform operation outcomes.

use serde::{Deserialize, Serialize};

/// The uniform result shape returned by every repository operation and by
/// the identity port's imperative calls.
///
/// Failure is encoded in the value, never as an `Err` crossing the
/// presentation boundary: transport errors are caught, logged and folded
/// into `{ success: false, message }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T = ()> {
    pub success: bool,
    /// User-facing message describing the result.
    pub message: String,
    /// Operation payload, present on success when the operation yields one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    /// A successful outcome with no payload.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// A successful outcome carrying a payload.
    #[must_use]
    pub fn ok_with(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let ok: Outcome = Outcome::ok("created");
        assert!(ok.success);
        assert!(ok.data.is_none());

        let with = Outcome::ok_with("found", 7);
        assert_eq!(with.data, Some(7));

        let failed: Outcome = Outcome::failure("store unavailable");
        assert!(!failed.success);
        assert_eq!(failed.message, "store unavailable");
    }
}
