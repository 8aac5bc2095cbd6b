//! Role classification.

use std::collections::HashSet;

use studyhub_core::{Email, Role};

use crate::config::CatalogConfig;

/// Maps a principal's email address to a role against the static admin
/// allow-list.
///
/// Pure and cheap to clone; the same classifier instance backs both the
/// session layer and the login outcome so the two can never disagree.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    admin_emails: HashSet<Email>,
}

impl RoleClassifier {
    /// Build a classifier from an explicit allow-list.
    #[must_use]
    pub fn new(admin_emails: impl IntoIterator<Item = Email>) -> Self {
        Self {
            admin_emails: admin_emails.into_iter().collect(),
        }
    }

    /// Build a classifier from the configured allow-list.
    #[must_use]
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.admin_emails.iter().cloned())
    }

    /// Classify an email address.
    #[must_use]
    pub fn classify(&self, email: &Email) -> Role {
        if self.admin_emails.contains(email) {
            Role::Admin
        } else {
            Role::Student
        }
    }

    /// Whether the address is on the admin allow-list.
    #[must_use]
    pub fn is_admin(&self, email: &Email) -> bool {
        self.classify(email) == Role::Admin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn classifier() -> RoleClassifier {
        RoleClassifier::new(vec![Email::parse("admin@studyhub.tn").unwrap()])
    }

    #[test]
    fn test_allow_listed_email_is_admin() {
        let c = classifier();
        assert_eq!(
            c.classify(&Email::parse("admin@studyhub.tn").unwrap()),
            Role::Admin
        );
        assert!(c.is_admin(&Email::parse("admin@studyhub.tn").unwrap()));
    }

    #[test]
    fn test_everyone_else_is_student() {
        let c = classifier();
        assert_eq!(
            c.classify(&Email::parse("someone@studyhub.tn").unwrap()),
            Role::Student
        );
        assert_eq!(
            c.classify(&Email::parse("admin@elsewhere.tn").unwrap()),
            Role::Student
        );
    }

    #[test]
    fn test_case_insensitive_via_email_normalization() {
        let c = classifier();
        assert!(c.is_admin(&Email::parse("Admin@StudyHub.TN").unwrap()));
    }
}
