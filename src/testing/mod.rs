//! In-memory catalog for tests and local experiments.
//!
//! `MemoryStore` behaves like the Postgres provider from the caller's point of
//! view: each `begin` hands out an isolated working copy, `commit` publishes
//! it, and dropping an uncommitted catalog discards it. Transactions are
//! serialized on one store-wide lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::models::{AuditEntry, ClassSession, Course, NewClassSession, PrerequisiteEdge, Room};
use crate::database::{Catalog, CatalogProvider, DatabaseError};
use crate::scheduling::Day;

#[derive(Debug, Clone, Default)]
struct MemoryData {
    courses: HashMap<Uuid, Course>,
    rooms: HashMap<Uuid, Room>,
    sessions: Vec<ClassSession>,
    edges: Vec<PrerequisiteEdge>,
    audit: Vec<AuditEntry>,
    locks: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `begin` and `health_check` fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub async fn add_course(&self, code: &str, campus_id: Uuid) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: format!("{} course", code),
            campus_id,
        };
        self.data.lock().await.courses.insert(course.id, course.clone());
        course
    }

    pub async fn add_room(&self, name: &str, campus_id: Uuid) -> Room {
        let room = Room {
            id: Uuid::new_v4(),
            name: name.to_string(),
            capacity: Some(30),
            campus_id,
        };
        self.data.lock().await.rooms.insert(room.id, room.clone());
        room
    }

    pub async fn add_session(&self, session: NewClassSession) -> ClassSession {
        let session = session.into_session(Uuid::new_v4());
        self.data.lock().await.sessions.push(session.clone());
        session
    }

    pub async fn add_edge(&self, course_id: Uuid, prerequisite_id: Uuid) {
        self.data
            .lock()
            .await
            .edges
            .push(PrerequisiteEdge::new(course_id, prerequisite_id));
    }

    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.data.lock().await.audit.clone()
    }

    pub async fn class_sessions(&self) -> Vec<ClassSession> {
        self.data.lock().await.sessions.clone()
    }

    pub async fn prerequisite_edges(&self) -> Vec<PrerequisiteEdge> {
        self.data.lock().await.edges.clone()
    }

    /// Advisory locks taken by committed transactions, oldest first.
    pub async fn lock_log(&self) -> Vec<String> {
        self.data.lock().await.locks.clone()
    }
}

#[async_trait]
impl CatalogProvider for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Catalog>, DatabaseError> {
        self.check_available()?;
        let guard = self.data.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryCatalog { guard, work }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}

pub struct MemoryCatalog {
    guard: OwnedMutexGuard<MemoryData>,
    work: MemoryData,
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn course(&mut self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        Ok(self.work.courses.get(&id).cloned())
    }

    async fn room(&mut self, id: Uuid) -> Result<Option<Room>, DatabaseError> {
        Ok(self.work.rooms.get(&id).cloned())
    }

    async fn lock_room(&mut self, room_id: Uuid) -> Result<(), DatabaseError> {
        self.work.locks.push(format!("room:{}", room_id));
        Ok(())
    }

    async fn lock_prerequisite_graph(&mut self) -> Result<(), DatabaseError> {
        self.work.locks.push("course_prerequisites".to_string());
        Ok(())
    }

    async fn room_sessions(
        &mut self,
        room_id: Uuid,
        day: Day,
        exclude_course: Uuid,
    ) -> Result<Vec<ClassSession>, DatabaseError> {
        let mut sessions: Vec<ClassSession> = self
            .work
            .sessions
            .iter()
            .filter(|s| s.room_id == Some(room_id) && s.day == day && s.course_id != exclude_course)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    async fn class_session(&mut self, id: Uuid, course_id: Uuid) -> Result<Option<ClassSession>, DatabaseError> {
        Ok(self
            .work
            .sessions
            .iter()
            .find(|s| s.id == id && s.course_id == course_id)
            .cloned())
    }

    async fn insert_class_session(&mut self, session: NewClassSession) -> Result<ClassSession, DatabaseError> {
        let session = session.into_session(Uuid::new_v4());
        self.work.sessions.push(session.clone());
        Ok(session)
    }

    async fn delete_class_session(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        self.work.sessions.retain(|s| s.id != id);
        Ok(())
    }

    async fn prerequisite_edge(
        &mut self,
        course_id: Uuid,
        prerequisite_id: Uuid,
    ) -> Result<Option<PrerequisiteEdge>, DatabaseError> {
        let wanted = PrerequisiteEdge::new(course_id, prerequisite_id);
        Ok(self.work.edges.iter().copied().find(|edge| *edge == wanted))
    }

    async fn prerequisite_edges(&mut self) -> Result<Vec<PrerequisiteEdge>, DatabaseError> {
        Ok(self.work.edges.clone())
    }

    async fn insert_prerequisite(&mut self, edge: PrerequisiteEdge) -> Result<(), DatabaseError> {
        self.work.edges.push(edge);
        Ok(())
    }

    async fn delete_prerequisite(&mut self, edge: PrerequisiteEdge) -> Result<(), DatabaseError> {
        self.work.edges.retain(|e| *e != edge);
        Ok(())
    }

    async fn record_audit(&mut self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        self.work.audit.push(entry.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryCatalog { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn monday_session(course_id: Uuid, room_id: Uuid) -> NewClassSession {
        NewClassSession {
            course_id,
            day: Day::Monday,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            room_id: Some(room_id),
        }
    }

    #[tokio::test]
    async fn uncommitted_work_is_discarded() {
        let store = MemoryStore::new();
        let campus = Uuid::new_v4();
        let course = store.add_course("MATH101", campus).await;
        let room = store.add_room("A-101", campus).await;

        {
            let mut catalog = store.begin().await.unwrap();
            catalog.insert_class_session(monday_session(course.id, room.id)).await.unwrap();
        }
        assert!(store.class_sessions().await.is_empty());

        let mut catalog = store.begin().await.unwrap();
        catalog.insert_class_session(monday_session(course.id, room.id)).await.unwrap();
        catalog.commit().await.unwrap();
        assert_eq!(store.class_sessions().await.len(), 1);
    }

    #[tokio::test]
    async fn room_sessions_filters_like_the_database() {
        let store = MemoryStore::new();
        let campus = Uuid::new_v4();
        let algebra = store.add_course("MATH101", campus).await;
        let physics = store.add_course("PHYS101", campus).await;
        let room = store.add_room("A-101", campus).await;
        store.add_session(monday_session(algebra.id, room.id)).await;

        let mut catalog = store.begin().await.unwrap();
        assert_eq!(catalog.room_sessions(room.id, Day::Monday, physics.id).await.unwrap().len(), 1);
        assert!(catalog.room_sessions(room.id, Day::Monday, algebra.id).await.unwrap().is_empty());
        assert!(catalog.room_sessions(room.id, Day::Tuesday, physics.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_store_fails_health_check() {
        let store = MemoryStore::new();
        assert!(store.health_check().await.is_ok());
        store.set_unavailable(true);
        assert!(store.health_check().await.is_err());
        assert!(store.begin().await.is_err());
    }
}
