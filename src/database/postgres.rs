use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::catalog::{Catalog, CatalogProvider};
use super::manager::{DatabaseError, DatabaseManager};
use super::models::{AuditEntry, ClassSession, Course, NewClassSession, PrerequisiteEdge, Room};
use crate::scheduling::Day;

const SESSION_COLUMNS: &str = "id, course_id, day, start_time, end_time, room_id";

/// Derive a stable 64-bit `pg_advisory_xact_lock` key from a scope name.
pub fn advisory_key(scope: &str) -> i64 {
    let digest = Sha256::digest(scope.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

fn room_lock_key(room_id: Uuid) -> i64 {
    advisory_key(&format!("room:{}", room_id))
}

fn prerequisite_graph_lock_key() -> i64 {
    advisory_key("course_prerequisites")
}

#[derive(Clone)]
pub struct PgCatalogProvider {
    pool: PgPool,
}

impl PgCatalogProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogProvider for PgCatalogProvider {
    async fn begin(&self) -> Result<Box<dyn Catalog>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgCatalog { tx }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// One Postgres transaction
pub struct PgCatalog {
    tx: Transaction<'static, Postgres>,
}

impl PgCatalog {
    async fn advisory_lock(&mut self, key: i64) -> Result<(), DatabaseError> {
        debug!(key, "Taking advisory lock");
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(key)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

fn course_from_row(row: &PgRow) -> Result<Course, DatabaseError> {
    Ok(Course {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        campus_id: row.try_get("campus_id")?,
    })
}

fn room_from_row(row: &PgRow) -> Result<Room, DatabaseError> {
    Ok(Room {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        capacity: row.try_get("capacity")?,
        campus_id: row.try_get("campus_id")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<ClassSession, DatabaseError> {
    let day: String = row.try_get("day")?;
    let day = day
        .parse::<Day>()
        .map_err(|e| DatabaseError::Corrupt(format!("class_times.day: {}", e)))?;

    Ok(ClassSession {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        day,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        room_id: row.try_get("room_id")?,
    })
}

fn edge_from_row(row: &PgRow) -> Result<PrerequisiteEdge, DatabaseError> {
    Ok(PrerequisiteEdge::new(row.try_get("course_id")?, row.try_get("prerequisite_id")?))
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn course(&mut self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        let row = sqlx::query("SELECT id, code, name, campus_id FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(course_from_row).transpose()
    }

    async fn room(&mut self, id: Uuid) -> Result<Option<Room>, DatabaseError> {
        let row = sqlx::query("SELECT id, name, capacity, campus_id FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn lock_room(&mut self, room_id: Uuid) -> Result<(), DatabaseError> {
        self.advisory_lock(room_lock_key(room_id)).await
    }

    async fn lock_prerequisite_graph(&mut self) -> Result<(), DatabaseError> {
        self.advisory_lock(prerequisite_graph_lock_key()).await
    }

    async fn room_sessions(
        &mut self,
        room_id: Uuid,
        day: Day,
        exclude_course: Uuid,
    ) -> Result<Vec<ClassSession>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM class_times WHERE room_id = $1 AND day = $2 AND course_id <> $3 ORDER BY start_time",
            SESSION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(room_id)
            .bind(day.as_str())
            .bind(exclude_course)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(session_from_row).collect()
    }

    async fn class_session(&mut self, id: Uuid, course_id: Uuid) -> Result<Option<ClassSession>, DatabaseError> {
        let sql = format!("SELECT {} FROM class_times WHERE id = $1 AND course_id = $2", SESSION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(course_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn insert_class_session(&mut self, session: NewClassSession) -> Result<ClassSession, DatabaseError> {
        let sql = format!(
            "INSERT INTO class_times ({}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            SESSION_COLUMNS, SESSION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(session.course_id)
            .bind(session.day.as_str())
            .bind(session.start_time)
            .bind(session.end_time)
            .bind(session.room_id)
            .fetch_one(&mut *self.tx)
            .await?;
        session_from_row(&row)
    }

    async fn delete_class_session(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM class_times WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn prerequisite_edge(
        &mut self,
        course_id: Uuid,
        prerequisite_id: Uuid,
    ) -> Result<Option<PrerequisiteEdge>, DatabaseError> {
        let row = sqlx::query(
            "SELECT course_id, prerequisite_id FROM course_prerequisites WHERE course_id = $1 AND prerequisite_id = $2",
        )
        .bind(course_id)
        .bind(prerequisite_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(edge_from_row).transpose()
    }

    async fn prerequisite_edges(&mut self) -> Result<Vec<PrerequisiteEdge>, DatabaseError> {
        let rows = sqlx::query("SELECT course_id, prerequisite_id FROM course_prerequisites")
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(edge_from_row).collect()
    }

    async fn insert_prerequisite(&mut self, edge: PrerequisiteEdge) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO course_prerequisites (course_id, prerequisite_id) VALUES ($1, $2)")
            .bind(edge.course_id)
            .bind(edge.prerequisite_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_prerequisite(&mut self, edge: PrerequisiteEdge) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM course_prerequisites WHERE course_id = $1 AND prerequisite_id = $2")
            .bind(edge.course_id)
            .bind(edge.prerequisite_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn record_audit(&mut self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id, old_value, new_value) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.entity_type.as_str())
        .bind(&entry.entity_id)
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}
