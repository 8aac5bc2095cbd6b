//! Client-side catalog filtering and access decisions.
//!
//! A pure derivation over the synchronized course list and the entitlement
//! set: no I/O, no mutation of its inputs, a fresh ordered list on every
//! call.

use std::collections::HashSet;

use studyhub_core::{Course, CourseId, CourseType};

/// Local, non-persisted type filter flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeFilters {
    pub td: bool,
    pub tp: bool,
    pub cour: bool,
}

impl TypeFilters {
    /// The student view's initial state: only COUR pre-selected.
    #[must_use]
    pub const fn student_default() -> Self {
        Self {
            td: false,
            tp: false,
            cour: true,
        }
    }

    /// Whether any flag is selected.
    #[must_use]
    pub const fn any(self) -> bool {
        self.td || self.tp || self.cour
    }

    /// Whether the flag for `course_type` is selected.
    #[must_use]
    pub const fn allows(self, course_type: CourseType) -> bool {
        match course_type {
            CourseType::Td => self.td,
            CourseType::Tp => self.tp,
            CourseType::Cour => self.cour,
        }
    }
}

/// What "no type flags selected" means.
///
/// The two observed call sites both behave as `ShowAll`; the policy is an
/// explicit parameter rather than a buried convention so a filter UI that
/// wants "nothing selected shows nothing" can opt in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoFilterPolicy {
    /// No flags selected means no type narrowing.
    #[default]
    ShowAll,
    /// No flags selected means an empty list.
    ShowNone,
}

/// What happens when the viewer selects a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    /// The viewer may open the course: owned, or free.
    Open,
    /// A paid course the viewer does not own: present the purchase
    /// confirmation (payment itself is stubbed).
    ConfirmPurchase,
}

/// One course in the derived list, with its access decision.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseEntry {
    pub course: Course,
    /// Whether an entitlement record exists for the viewer.
    pub owned: bool,
    pub access: AccessAction,
}

/// Local filter and search state for the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogView {
    pub filters: TypeFilters,
    pub policy: NoFilterPolicy,
    /// Free-text query, matched case-insensitively against titles.
    pub query: String,
}

impl CatalogView {
    /// The student view's initial state.
    #[must_use]
    pub fn student_default() -> Self {
        Self {
            filters: TypeFilters::student_default(),
            ..Self::default()
        }
    }

    /// Derive the displayed list from a snapshot and the entitlement set.
    ///
    /// Order is preserved from the input snapshot. The inputs are not
    /// mutated; the output is freshly allocated.
    #[must_use]
    pub fn derive(&self, courses: &[Course], owned: &HashSet<CourseId>) -> Vec<CourseEntry> {
        let query = self.query.trim();
        courses
            .iter()
            .filter(|course| self.type_allows(course.course_type))
            .filter(|course| query.is_empty() || course.title_matches(query))
            .map(|course| {
                let is_owned = owned.contains(&course.id);
                CourseEntry {
                    course: course.clone(),
                    owned: is_owned,
                    access: access_action(course, is_owned),
                }
            })
            .collect()
    }

    fn type_allows(&self, course_type: CourseType) -> bool {
        if self.filters.any() {
            self.filters.allows(course_type)
        } else {
            match self.policy {
                NoFilterPolicy::ShowAll => true,
                NoFilterPolicy::ShowNone => false,
            }
        }
    }
}

/// The access decision for one course.
///
/// Owned courses open; free courses open without an entitlement record
/// being written; everything else asks for purchase confirmation.
#[must_use]
pub fn access_action(course: &Course, owned: bool) -> AccessAction {
    if owned || course.price.is_free() {
        AccessAction::Open
    } else {
        AccessAction::ConfirmPurchase
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use studyhub_core::Price;

    use super::*;

    fn course(id: &str, title: &str, course_type: &str, price: u32) -> Course {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "type": course_type,
            "price": price.to_string(),
            "createdBy": "admin-1"
        }))
        .unwrap()
    }

    fn catalog() -> Vec<Course> {
        vec![
            course("c1", "Algo 101", "COUR", 0),
            course("c2", "Graphs TD", "TD", 12),
            course("c3", "Compilers TP", "TP", 20),
        ]
    }

    #[test]
    fn test_no_flags_show_all_policy() {
        let view = CatalogView::default();
        let entries = view.derive(&catalog(), &HashSet::new());
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_no_flags_show_none_policy() {
        let view = CatalogView {
            policy: NoFilterPolicy::ShowNone,
            ..CatalogView::default()
        };
        assert!(view.derive(&catalog(), &HashSet::new()).is_empty());
    }

    #[test]
    fn test_type_narrowing_when_flags_selected() {
        let view = CatalogView {
            filters: TypeFilters {
                td: true,
                tp: false,
                cour: true,
            },
            ..CatalogView::default()
        };
        let entries = view.derive(&catalog(), &HashSet::new());
        let ids: Vec<&str> = entries.iter().map(|e| e.course.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_student_default_seeds_cour() {
        let view = CatalogView::student_default();
        let entries = view.derive(&catalog(), &HashSet::new());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().course.id.as_str(), "c1");
    }

    #[test]
    fn test_search_is_case_insensitive_title_substring() {
        let view = CatalogView {
            query: "algo".to_owned(),
            ..CatalogView::default()
        };
        let entries = view.derive(&catalog(), &HashSet::new());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().course.title, "Algo 101");
    }

    #[test]
    fn test_whitespace_query_is_noop() {
        let view = CatalogView {
            query: "   ".to_owned(),
            ..CatalogView::default()
        };
        assert_eq!(view.derive(&catalog(), &HashSet::new()).len(), 3);
    }

    #[test]
    fn test_access_decisions() {
        let free = course("c1", "Free", "COUR", 0);
        let paid = course("c2", "Paid", "COUR", 12);
        let owned: HashSet<CourseId> = [CourseId::new("c2")].into_iter().collect();

        assert_eq!(access_action(&free, false), AccessAction::Open);
        assert_eq!(access_action(&paid, false), AccessAction::ConfirmPurchase);
        assert_eq!(access_action(&paid, owned.contains(&paid.id)), AccessAction::Open);
    }

    #[test]
    fn test_derive_marks_ownership() {
        let view = CatalogView::default();
        let owned: HashSet<CourseId> = [CourseId::new("c2")].into_iter().collect();
        let entries = view.derive(&catalog(), &owned);

        let c2 = entries.iter().find(|e| e.course.id.as_str() == "c2").unwrap();
        assert!(c2.owned);
        assert_eq!(c2.access, AccessAction::Open);

        let c3 = entries.iter().find(|e| e.course.id.as_str() == "c3").unwrap();
        assert!(!c3.owned);
        assert_eq!(c3.access, AccessAction::ConfirmPurchase);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let courses = catalog();
        let before = courses.clone();
        let view = CatalogView {
            query: "algo".to_owned(),
            ..CatalogView::default()
        };
        let _ = view.derive(&courses, &HashSet::new());
        assert_eq!(courses, before);
    }

    #[test]
    fn test_price_parses_from_string_form() {
        let paid = course("c2", "Paid", "COUR", 12);
        assert_eq!(paid.price, Price::new(Decimal::new(12, 0)).unwrap());
    }
}
