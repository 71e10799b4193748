use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{AuditEntry, Course, PrerequisiteEdge, PrerequisiteView};
use crate::database::{Catalog, DatabaseError};
use crate::prerequisites::PrerequisiteGraph;
use crate::types::AuditEntity;

#[derive(Debug, Error)]
pub enum PrerequisiteError {
    #[error("Prerequisite ID is required.")]
    MissingId,

    #[error("'{0}' is not a valid prerequisite id")]
    InvalidId(String),

    #[error("Course not found.")]
    CourseNotFound,

    #[error("Prerequisite course not found.")]
    PrerequisiteNotFound,

    #[error("This prerequisite is already added to the course.")]
    AlreadyExists,

    #[error("A course cannot be its own prerequisite.")]
    SelfReference,

    #[error("Adding this prerequisite would create a circular reference.")]
    Cycle,

    #[error("Prerequisite relationship not found.")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Body of `POST /api/admin/course/:courseId/prerequisites`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPrerequisiteRequest {
    pub prerequisite_id: Option<String>,
}

impl AddPrerequisiteRequest {
    pub fn validate(&self) -> Result<Uuid, PrerequisiteError> {
        let raw = self
            .prerequisite_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(PrerequisiteError::MissingId)?;
        Uuid::parse_str(raw).map_err(|_| PrerequisiteError::InvalidId(raw.to_string()))
    }
}

/// Record that `course_id` requires `prerequisite_id`, keeping the graph acyclic.
///
/// Checks run in a fixed order: both courses exist, the edge is new, it is not
/// a self-reference, and it does not close a cycle.
pub async fn add_prerequisite(
    catalog: &mut dyn Catalog,
    principal: &Principal,
    course_id: Uuid,
    prerequisite_id: Uuid,
) -> Result<PrerequisiteView, PrerequisiteError> {
    let course = catalog.course(course_id).await?.ok_or(PrerequisiteError::CourseNotFound)?;
    let prerequisite = catalog
        .course(prerequisite_id)
        .await?
        .ok_or(PrerequisiteError::PrerequisiteNotFound)?;

    catalog.lock_prerequisite_graph().await?;

    if catalog.prerequisite_edge(course_id, prerequisite_id).await?.is_some() {
        return Err(PrerequisiteError::AlreadyExists);
    }
    if course_id == prerequisite_id {
        return Err(PrerequisiteError::SelfReference);
    }

    let graph = PrerequisiteGraph::from_edges(catalog.prerequisite_edges().await?);
    if graph.would_create_cycle(course_id, prerequisite_id) {
        warn!(course = %course.code, prerequisite = %prerequisite.code, "Rejected circular prerequisite");
        return Err(PrerequisiteError::Cycle);
    }

    let edge = PrerequisiteEdge::new(course_id, prerequisite_id);
    catalog.insert_prerequisite(edge).await?;

    let view = PrerequisiteView {
        edge,
        course,
        prerequisite,
    };
    catalog
        .record_audit(&AuditEntry::created(
            principal.id,
            AuditEntity::CoursePrerequisite,
            edge.audit_id(),
            &view,
        )?)
        .await?;

    info!(course = %view.course.code, prerequisite = %view.prerequisite.code, "Added prerequisite");
    Ok(view)
}

pub async fn remove_prerequisite(
    catalog: &mut dyn Catalog,
    principal: &Principal,
    course_id: Uuid,
    prerequisite_id: Uuid,
) -> Result<PrerequisiteEdge, PrerequisiteError> {
    let edge = catalog
        .prerequisite_edge(course_id, prerequisite_id)
        .await?
        .ok_or(PrerequisiteError::NotFound)?;

    let view = PrerequisiteView {
        edge,
        course: stored_course(catalog, course_id).await?,
        prerequisite: stored_course(catalog, prerequisite_id).await?,
    };

    catalog.delete_prerequisite(edge).await?;
    catalog
        .record_audit(&AuditEntry::deleted(
            principal.id,
            AuditEntity::CoursePrerequisite,
            edge.audit_id(),
            &view,
        )?)
        .await?;

    info!(course = %course_id, prerequisite = %prerequisite_id, "Removed prerequisite");
    Ok(edge)
}

/// A course an existing edge points at; foreign keys guarantee it is there.
async fn stored_course(catalog: &mut dyn Catalog, id: Uuid) -> Result<Course, DatabaseError> {
    catalog
        .course(id)
        .await?
        .ok_or_else(|| DatabaseError::Corrupt(format!("course_prerequisites references missing course {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::database::CatalogProvider;
    use crate::testing::MemoryStore;
    use crate::types::AuditAction;

    fn admin() -> Principal {
        Principal {
            id: Uuid::from_u128(7),
            email: "admin@campus.test".to_string(),
            role: Role::Admin,
        }
    }

    /// Courses A, B and C where A requires B and B requires C.
    async fn chain() -> (MemoryStore, Uuid, Uuid, Uuid) {
        let store = MemoryStore::new();
        let campus = Uuid::new_v4();
        let a = store.add_course("A", campus).await.id;
        let b = store.add_course("B", campus).await.id;
        let c = store.add_course("C", campus).await.id;
        store.add_edge(a, b).await;
        store.add_edge(b, c).await;
        (store, a, b, c)
    }

    async fn add(store: &MemoryStore, course: Uuid, prerequisite: Uuid) -> Result<PrerequisiteView, PrerequisiteError> {
        let mut catalog = store.begin().await?;
        let view = add_prerequisite(catalog.as_mut(), &admin(), course, prerequisite).await?;
        catalog.commit().await?;
        Ok(view)
    }

    #[test]
    fn validate_requires_an_id() {
        assert!(matches!(
            AddPrerequisiteRequest::default().validate(),
            Err(PrerequisiteError::MissingId)
        ));
        let blank = AddPrerequisiteRequest {
            prerequisite_id: Some(" ".to_string()),
        };
        assert!(matches!(blank.validate(), Err(PrerequisiteError::MissingId)));
        let garbage = AddPrerequisiteRequest {
            prerequisite_id: Some("calc-1".to_string()),
        };
        assert!(matches!(garbage.validate(), Err(PrerequisiteError::InvalidId(_))));
    }

    #[tokio::test]
    async fn closing_the_chain_is_rejected() {
        let (store, a, _, c) = chain().await;
        assert!(matches!(add(&store, c, a).await, Err(PrerequisiteError::Cycle)));
        assert_eq!(store.prerequisite_edges().await.len(), 2);
        assert!(store.audit_entries().await.is_empty());
    }

    #[tokio::test]
    async fn acyclic_edge_is_added_and_audited() {
        let (store, a, _, c) = chain().await;
        let view = add(&store, a, c).await.unwrap();
        assert_eq!(view.edge, PrerequisiteEdge::new(a, c));
        assert_eq!(view.prerequisite.code, "C");
        assert_eq!(store.prerequisite_edges().await.len(), 3);
        assert_eq!(store.lock_log().await, vec!["course_prerequisites".to_string()]);

        let audit = store.audit_entries().await;
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, AuditAction::Create);
        assert_eq!(audit[0].entity_type, AuditEntity::CoursePrerequisite);
        assert_eq!(audit[0].entity_id, format!("{}_{}", a, c));
    }

    #[tokio::test]
    async fn duplicate_is_a_conflict() {
        let (store, a, b, _) = chain().await;
        assert!(matches!(add(&store, a, b).await, Err(PrerequisiteError::AlreadyExists)));
    }

    #[tokio::test]
    async fn self_reference_is_rejected() {
        let (store, a, _, _) = chain().await;
        assert!(matches!(add(&store, a, a).await, Err(PrerequisiteError::SelfReference)));
    }

    #[tokio::test]
    async fn missing_courses() {
        let (store, a, _, _) = chain().await;
        assert!(matches!(
            add(&store, Uuid::new_v4(), a).await,
            Err(PrerequisiteError::CourseNotFound)
        ));
        assert!(matches!(
            add(&store, a, Uuid::new_v4()).await,
            Err(PrerequisiteError::PrerequisiteNotFound)
        ));
    }

    #[tokio::test]
    async fn removing_an_edge_allows_the_reverse() {
        let (store, a, b, c) = chain().await;

        let mut catalog = store.begin().await.unwrap();
        let removed = remove_prerequisite(catalog.as_mut(), &admin(), b, c).await.unwrap();
        catalog.commit().await.unwrap();
        assert_eq!(removed, PrerequisiteEdge::new(b, c));

        let audit = store.audit_entries().await;
        assert_eq!(audit[0].action, AuditAction::Delete);
        let old = audit[0].old_value.as_ref().unwrap();
        assert_eq!(old["prerequisiteId"], c.to_string());
        assert_eq!(old["course"]["code"], "B");
        assert_eq!(old["prerequisite"]["code"], "C");

        assert!(add(&store, c, a).await.is_ok());
    }

    #[tokio::test]
    async fn removing_a_missing_edge_is_not_found() {
        let (store, a, _, c) = chain().await;
        let mut catalog = store.begin().await.unwrap();
        let result = remove_prerequisite(catalog.as_mut(), &admin(), a, c).await;
        assert!(matches!(result, Err(PrerequisiteError::NotFound)));
    }
}
