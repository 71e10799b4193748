use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::manager::DatabaseError;
use crate::scheduling::{Day, TimeRange};
use crate::types::{AuditAction, AuditEntity};

/// Course row, limited to the columns scheduling and prerequisites touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub campus_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: Option<i32>,
    pub campus_id: Uuid,
}

/// One weekly meeting of a course (`class_times` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: Uuid,
    pub course_id: Uuid,
    pub day: Day,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<Uuid>,
}

impl ClassSession {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::stored(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClassSession {
    pub course_id: Uuid,
    pub day: Day,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: Option<Uuid>,
}

impl NewClassSession {
    pub fn into_session(self, id: Uuid) -> ClassSession {
        ClassSession {
            id,
            course_id: self.course_id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            room_id: self.room_id,
        }
    }
}

/// A class session together with the room it is booked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSessionView {
    #[serde(flatten)]
    pub session: ClassSession,
    pub room: Option<Room>,
}

/// A class session with its course and room, as recorded when it is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSessionSnapshot {
    #[serde(flatten)]
    pub session: ClassSession,
    pub course: Course,
    pub room: Option<Room>,
}

/// `course_id` requires `prerequisite_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteEdge {
    pub course_id: Uuid,
    pub prerequisite_id: Uuid,
}

impl PrerequisiteEdge {
    pub fn new(course_id: Uuid, prerequisite_id: Uuid) -> Self {
        Self { course_id, prerequisite_id }
    }

    /// Identifier used for audit entries: `<courseId>_<prerequisiteId>`.
    pub fn audit_id(&self) -> String {
        format!("{}_{}", self.course_id, self.prerequisite_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteView {
    #[serde(flatten)]
    pub edge: PrerequisiteEdge,
    pub course: Course,
    pub prerequisite: Course,
}

/// Snapshot handed to the audit log collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub user_id: Uuid,
    pub action: AuditAction,
    pub entity_type: AuditEntity,
    pub entity_id: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl AuditEntry {
    pub fn created<T: Serialize>(
        user_id: Uuid,
        entity_type: AuditEntity,
        entity_id: String,
        value: &T,
    ) -> Result<Self, DatabaseError> {
        Ok(Self {
            user_id,
            action: AuditAction::Create,
            entity_type,
            entity_id,
            old_value: None,
            new_value: Some(serde_json::to_value(value)?),
        })
    }

    pub fn deleted<T: Serialize>(
        user_id: Uuid,
        entity_type: AuditEntity,
        entity_id: String,
        value: &T,
    ) -> Result<Self, DatabaseError> {
        Ok(Self {
            user_id,
            action: AuditAction::Delete,
            entity_type,
            entity_id,
            old_value: Some(serde_json::to_value(value)?),
            new_value: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn snapshots_use_camel_case_fields() {
        let edge = PrerequisiteEdge::new(Uuid::from_u128(1), Uuid::from_u128(2));
        let entry = AuditEntry::deleted(Uuid::from_u128(9), AuditEntity::CoursePrerequisite, edge.audit_id(), &edge)
            .unwrap();
        assert_eq!(entry.action, AuditAction::Delete);
        assert!(entry.new_value.is_none());
        let old = entry.old_value.unwrap();
        assert_eq!(old["courseId"], Uuid::from_u128(1).to_string());
        assert_eq!(old["prerequisiteId"], Uuid::from_u128(2).to_string());
    }

    #[test]
    fn unserializable_snapshot_is_an_error() {
        // JSON object keys must be strings
        let mut value = HashMap::new();
        value.insert((1u8, 2u8), "tuple key");
        let result = AuditEntry::created(Uuid::from_u128(9), AuditEntity::ClassTime, "x".to_string(), &value);
        assert!(matches!(result, Err(DatabaseError::Snapshot(_))));
    }
}
