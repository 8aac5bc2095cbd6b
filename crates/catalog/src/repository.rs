//! Course CRUD against the remote store.
//!
//! Every operation returns a uniform [`Outcome`]: transport failures are
//! caught here, logged, and folded into `{ success: false, message }` -
//! nothing throws past this boundary. Read paths return domain values with
//! safe defaults (absent, empty list) instead.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use studyhub_core::{Course, CourseId, CourseStatus, Outcome, Price, PrincipalId, Resource};

use crate::error::ValidationError;
use crate::ports::store::{DocumentStore, Filter, collections};

/// Typed partial update for course fields.
///
/// Only the set fields are patched; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl CourseUpdate {
    fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = self.title {
            fields.insert("title".to_owned(), Value::String(title));
        }
        if let Some(description) = self.description {
            fields.insert("description".to_owned(), Value::String(description));
        }
        if let Some(price) = self.price {
            fields.insert(
                "price".to_owned(),
                serde_json::to_value(price).unwrap_or_default(),
            );
        }
        if let Some(category) = self.category {
            fields.insert("category".to_owned(), Value::String(category));
        }
        if let Some(thumbnail_url) = self.thumbnail_url {
            fields.insert("thumbnailUrl".to_owned(), Value::String(thumbnail_url));
        }
        fields
    }
}

/// Repository for course store operations.
///
/// Constructed with an injected store; consumers hold their own instance
/// rather than reaching for process-wide state.
#[derive(Clone)]
pub struct CourseRepository {
    store: Arc<dyn DocumentStore>,
}

impl CourseRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a course.
    ///
    /// The caller supplies a pre-generated id (see [`CourseId::generate`]);
    /// the initial status is forced to `Draft` whatever the input says and
    /// the creation timestamp is stamped here.
    pub async fn create(&self, mut course: Course) -> Outcome<CourseId> {
        course.status = CourseStatus::Draft;
        course.created_at = Some(Utc::now());
        let id = course.id.clone();
        let document = match serde_json::to_value(&course) {
            Ok(document) => document,
            Err(error) => {
                tracing::error!(course = %id, %error, "course serialization failed");
                return Outcome::failure("Unable to create the course");
            }
        };
        match self
            .store
            .put(collections::COURSES, id.as_str(), document)
            .await
        {
            Ok(()) => Outcome::ok_with("Course created", id),
            Err(error) => {
                tracing::error!(course = %id, %error, "create failed");
                Outcome::failure("Unable to create the course")
            }
        }
    }

    /// Patch the set fields of an existing course.
    pub async fn update(&self, id: &CourseId, update: CourseUpdate) -> Outcome {
        let fields = update.into_fields();
        if fields.is_empty() {
            return Outcome::ok("Nothing to update");
        }
        match self
            .store
            .patch(collections::COURSES, id.as_str(), fields)
            .await
        {
            Ok(()) => Outcome::ok("Course updated"),
            Err(error) => {
                tracing::error!(course = %id, %error, "update failed");
                Outcome::failure("Unable to update the course")
            }
        }
    }

    /// Change a course's status; used for `Draft -> Published`.
    ///
    /// The transition is validated against the current document before any
    /// write: publishing is one-way.
    pub async fn update_status(&self, id: &CourseId, status: CourseStatus) -> Outcome {
        let current = match self.get_by_id(id).await {
            Some(course) => course.status,
            None => return Outcome::failure("Course not found"),
        };
        if !current.can_transition_to(status) {
            let error = ValidationError::IllegalStatusTransition {
                from: current,
                to: status,
            };
            return Outcome::failure(error.to_string());
        }

        let mut fields = Map::new();
        fields.insert(
            "status".to_owned(),
            serde_json::to_value(status).unwrap_or_default(),
        );
        match self
            .store
            .patch(collections::COURSES, id.as_str(), fields)
            .await
        {
            Ok(()) => Outcome::ok(format!("Status updated: {status}")),
            Err(error) => {
                tracing::error!(course = %id, %error, "status update failed");
                Outcome::failure("Unable to update the status")
            }
        }
    }

    /// Append a resource to the course's resource sequence.
    ///
    /// Uses the store's additive merge so concurrent additions from other
    /// sessions are not clobbered.
    pub async fn add_resource(&self, id: &CourseId, resource: Resource) -> Outcome {
        let element = match serde_json::to_value(&resource) {
            Ok(element) => element,
            Err(error) => {
                tracing::error!(course = %id, %error, "resource serialization failed");
                return Outcome::failure("Unable to add the resource");
            }
        };
        match self
            .store
            .array_union(collections::COURSES, id.as_str(), "resources", element)
            .await
        {
            Ok(()) => Outcome::ok("Resource added"),
            Err(error) => {
                tracing::error!(course = %id, %error, "add resource failed");
                Outcome::failure("Unable to add the resource")
            }
        }
    }

    /// Remove a resource, matched by full value equality.
    pub async fn remove_resource(&self, id: &CourseId, resource: &Resource) -> Outcome {
        let element = match serde_json::to_value(resource) {
            Ok(element) => element,
            Err(error) => {
                tracing::error!(course = %id, %error, "resource serialization failed");
                return Outcome::failure("Unable to remove the resource");
            }
        };
        match self
            .store
            .array_remove(collections::COURSES, id.as_str(), "resources", element)
            .await
        {
            Ok(()) => Outcome::ok("Resource removed"),
            Err(error) => {
                tracing::error!(course = %id, %error, "remove resource failed");
                Outcome::failure("Unable to remove the resource")
            }
        }
    }

    /// Delete a course document.
    ///
    /// Uploaded resource files are left behind in storage; only the
    /// document (and with it the embedded resource records) goes away.
    pub async fn delete(&self, id: &CourseId) -> Outcome {
        match self.store.delete(collections::COURSES, id.as_str()).await {
            Ok(()) => Outcome::ok("Course deleted"),
            Err(error) => {
                tracing::error!(course = %id, %error, "delete failed");
                Outcome::failure("Unable to delete the course")
            }
        }
    }

    /// Fetch one course. Absent is `None`, never a failure.
    pub async fn get_by_id(&self, id: &CourseId) -> Option<Course> {
        let document = match self.store.get(collections::COURSES, id.as_str()).await {
            Ok(Some(document)) => document,
            Ok(None) => return None,
            Err(error) => {
                tracing::error!(course = %id, %error, "get failed");
                return None;
            }
        };
        match serde_json::from_value(document) {
            Ok(course) => Some(course),
            Err(error) => {
                tracing::error!(course = %id, %error, "malformed course document");
                None
            }
        }
    }

    /// All published courses.
    pub async fn list_published(&self) -> Vec<Course> {
        let published = serde_json::to_value(CourseStatus::Published).unwrap_or_default();
        self.query_courses(&Filter::field("status", published)).await
    }

    /// All courses authored by `owner`, any status.
    pub async fn list_by_owner(&self, owner: &PrincipalId) -> Vec<Course> {
        self.query_courses(&Filter::field("createdBy", owner.as_str()))
            .await
    }

    /// Case-insensitive substring search over titles and descriptions.
    ///
    /// Fetches the full collection and filters client-side; fine at this
    /// catalog's scale, no server-side text index behind it.
    pub async fn search(&self, term: &str) -> Vec<Course> {
        let needle = term.to_lowercase();
        self.query_courses(&Filter::all())
            .await
            .into_iter()
            .filter(|course| {
                course.title.to_lowercase().contains(&needle)
                    || course.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    async fn query_courses(&self, filter: &Filter) -> Vec<Course> {
        let documents = match self.store.query(collections::COURSES, filter).await {
            Ok(documents) => documents,
            Err(error) => {
                tracing::error!(%error, "course query failed");
                return Vec::new();
            }
        };
        documents
            .into_iter()
            .filter_map(|document| match serde_json::from_value::<Course>(document) {
                Ok(course) => Some(course),
                Err(error) => {
                    tracing::error!(%error, "dropping malformed course document");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use studyhub_core::{ResourceId, ResourceKind};

    use super::*;
    use crate::memory::store::MemoryStore;

    fn repository() -> (CourseRepository, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (
            CourseRepository::new(Arc::clone(&store) as Arc<dyn DocumentStore>),
            store,
        )
    }

    fn course(id: &str, title: &str) -> Course {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "type": "COUR",
            "createdBy": "admin-1"
        }))
        .unwrap()
    }

    fn resource(id: &str) -> Resource {
        Resource {
            id: ResourceId::new(id),
            kind: ResourceKind::Pdf,
            title: "Notes".to_owned(),
            url: "https://docs.example.com/notes".to_owned(),
            storage_path: None,
            size_bytes: None,
            mime_type: ResourceKind::Pdf.mime_type().to_owned(),
            uploaded_by: PrincipalId::new("admin-1"),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_forces_draft_and_roundtrips() {
        let (repository, _store) = repository();
        let mut draft = course("c1", "Algo 101");
        draft.status = CourseStatus::Published;

        let outcome = repository.create(draft).await;
        assert!(outcome.success);
        assert_eq!(outcome.data.unwrap().as_str(), "c1");

        let stored = repository.get_by_id(&CourseId::new("c1")).await.unwrap();
        assert_eq!(stored.status, CourseStatus::Draft);
        assert_eq!(stored.title, "Algo 101");
        assert!(stored.created_at.is_some());
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let (repository, _store) = repository();
        assert!(repository.get_by_id(&CourseId::new("ghost")).await.is_none());
    }

    #[tokio::test]
    async fn test_update_patches_only_set_fields() {
        let (repository, _store) = repository();
        repository.create(course("c1", "Algo 101")).await;

        let outcome = repository
            .update(
                &CourseId::new("c1"),
                CourseUpdate {
                    description: Some("Sorting and searching".to_owned()),
                    ..CourseUpdate::default()
                },
            )
            .await;
        assert!(outcome.success);

        let stored = repository.get_by_id(&CourseId::new("c1")).await.unwrap();
        assert_eq!(stored.title, "Algo 101");
        assert_eq!(stored.description, "Sorting and searching");
    }

    #[tokio::test]
    async fn test_publish_then_unpublish_rejected() {
        let (repository, _store) = repository();
        repository.create(course("c1", "Algo 101")).await;
        let id = CourseId::new("c1");

        let published = repository.update_status(&id, CourseStatus::Published).await;
        assert!(published.success);
        assert_eq!(
            repository.get_by_id(&id).await.unwrap().status,
            CourseStatus::Published
        );

        let reverted = repository.update_status(&id, CourseStatus::Draft).await;
        assert!(!reverted.success);
        // The illegal transition was rejected before any write.
        assert_eq!(
            repository.get_by_id(&id).await.unwrap().status,
            CourseStatus::Published
        );
    }

    #[tokio::test]
    async fn test_update_status_on_missing_course_fails() {
        let (repository, _store) = repository();
        let outcome = repository
            .update_status(&CourseId::new("ghost"), CourseStatus::Published)
            .await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_add_and_remove_resource() {
        let (repository, _store) = repository();
        repository.create(course("c1", "Algo 101")).await;
        let id = CourseId::new("c1");

        assert!(repository.add_resource(&id, resource("r1")).await.success);
        assert!(repository.add_resource(&id, resource("r2")).await.success);
        let stored = repository.get_by_id(&id).await.unwrap();
        assert_eq!(stored.resources.len(), 2);

        assert!(
            repository
                .remove_resource(&id, &resource("r1"))
                .await
                .success
        );
        let stored = repository.get_by_id(&id).await.unwrap();
        assert_eq!(stored.resources.len(), 1);
        assert_eq!(stored.resources.first().unwrap().id.as_str(), "r2");
    }

    #[tokio::test]
    async fn test_delete() {
        let (repository, _store) = repository();
        repository.create(course("c1", "Algo 101")).await;
        let id = CourseId::new("c1");

        assert!(repository.delete(&id).await.success);
        assert!(repository.get_by_id(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_and_published() {
        let (repository, store) = repository();
        repository.create(course("c1", "Algo 101")).await;
        repository.create(course("c2", "Graphs")).await;
        store.seed(
            collections::COURSES,
            "c3",
            json!({
                "id": "c3",
                "title": "Other admin's course",
                "type": "TD",
                "status": "published",
                "createdBy": "admin-2"
            }),
        );
        repository
            .update_status(&CourseId::new("c1"), CourseStatus::Published)
            .await;

        let owned = repository.list_by_owner(&PrincipalId::new("admin-1")).await;
        let ids: Vec<&str> = owned.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);

        let published = repository.list_published().await;
        let ids: Vec<&str> = published.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description() {
        let (repository, _store) = repository();
        let mut with_description = course("c1", "Algo 101");
        with_description.description = "Dynamic programming".to_owned();
        repository.create(with_description).await;
        repository.create(course("c2", "Programming Basics")).await;
        repository.create(course("c3", "Databases")).await;

        let hits = repository.search("PROGRAMMING").await;
        let ids: Vec<&str> = hits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_failed_outcome() {
        let (repository, store) = repository();
        store.set_offline(true);

        let outcome = repository.create(course("c1", "Algo 101")).await;
        assert!(!outcome.success);

        assert!(repository.list_published().await.is_empty());
        assert!(repository.get_by_id(&CourseId::new("c1")).await.is_none());
    }
}
