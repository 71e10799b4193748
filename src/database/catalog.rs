use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{AuditEntry, ClassSession, Course, NewClassSession, PrerequisiteEdge, Room};
use crate::scheduling::Day;

/// Data-access collaborator for one unit of work.
///
/// Every value returned by `begin` wraps a single transaction. Nothing is
/// visible to other requests until `commit`; dropping the catalog without
/// committing rolls everything back.
#[async_trait]
pub trait Catalog: Send {
    async fn course(&mut self, id: Uuid) -> Result<Option<Course>, DatabaseError>;

    async fn room(&mut self, id: Uuid) -> Result<Option<Room>, DatabaseError>;

    /// Serialize writers booking `room_id` until this unit of work ends.
    async fn lock_room(&mut self, room_id: Uuid) -> Result<(), DatabaseError>;

    /// Serialize writers of the prerequisite graph until this unit of work ends.
    async fn lock_prerequisite_graph(&mut self) -> Result<(), DatabaseError>;

    /// Sessions booked in `room_id` on `day`, excluding those of `exclude_course`.
    async fn room_sessions(
        &mut self,
        room_id: Uuid,
        day: Day,
        exclude_course: Uuid,
    ) -> Result<Vec<ClassSession>, DatabaseError>;

    /// A session by id, only if it belongs to `course_id`.
    async fn class_session(&mut self, id: Uuid, course_id: Uuid) -> Result<Option<ClassSession>, DatabaseError>;

    async fn insert_class_session(&mut self, session: NewClassSession) -> Result<ClassSession, DatabaseError>;

    async fn delete_class_session(&mut self, id: Uuid) -> Result<(), DatabaseError>;

    async fn prerequisite_edge(
        &mut self,
        course_id: Uuid,
        prerequisite_id: Uuid,
    ) -> Result<Option<PrerequisiteEdge>, DatabaseError>;

    /// Every stored "course requires prerequisite" edge.
    async fn prerequisite_edges(&mut self) -> Result<Vec<PrerequisiteEdge>, DatabaseError>;

    async fn insert_prerequisite(&mut self, edge: PrerequisiteEdge) -> Result<(), DatabaseError>;

    async fn delete_prerequisite(&mut self, edge: PrerequisiteEdge) -> Result<(), DatabaseError>;

    async fn record_audit(&mut self, entry: &AuditEntry) -> Result<(), DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Hands out catalogs; shared by every request through `AppState`.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Catalog>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
