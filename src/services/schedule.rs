use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{AuditEntry, ClassSession, ClassSessionSnapshot, ClassSessionView, NewClassSession};
use crate::database::{Catalog, DatabaseError};
use crate::scheduling::{check_conflicts, parse_time_of_day, Day, ProposedSession, TimeError, TimeRange};
use crate::types::AuditEntity;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Day, start time, and end time are required.")]
    MissingFields,

    #[error("{message}")]
    InvalidField { field: &'static str, message: String },

    #[error("End time must be after start time.")]
    EndNotAfterStart,

    #[error("Course not found.")]
    CourseNotFound,

    #[error("Room not found.")]
    RoomNotFound,

    #[error("Room must be in the same campus as the course.")]
    RoomCampusMismatch,

    #[error("The room is already booked during this time.")]
    Conflict(Vec<ClassSession>),

    #[error("Class time not found or does not belong to this course.")]
    SessionNotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Body of `POST /api/admin/course/:courseId/schedule`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassSessionRequest {
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room_id: Option<String>,
}

/// A request body that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInput {
    pub day: Day,
    pub range: TimeRange,
    pub room_id: Option<Uuid>,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn time_field(field: &'static str, raw: &str) -> Result<chrono::NaiveTime, ScheduleError> {
    parse_time_of_day(raw).map_err(|e| ScheduleError::InvalidField {
        field,
        message: e.to_string(),
    })
}

impl CreateClassSessionRequest {
    pub fn validate(&self) -> Result<SessionInput, ScheduleError> {
        let (Some(day), Some(start), Some(end)) = (
            required(&self.day),
            required(&self.start_time),
            required(&self.end_time),
        ) else {
            return Err(ScheduleError::MissingFields);
        };

        let day = day.parse::<Day>().map_err(|e| ScheduleError::InvalidField {
            field: "day",
            message: e.to_string(),
        })?;
        let start = time_field("startTime", start)?;
        let end = time_field("endTime", end)?;
        let range = TimeRange::new(start, end).map_err(|e| match e {
            TimeError::EndNotAfterStart => ScheduleError::EndNotAfterStart,
            other => ScheduleError::InvalidField {
                field: "endTime",
                message: other.to_string(),
            },
        })?;

        let room_id = match required(&self.room_id) {
            None => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| ScheduleError::InvalidField {
                field: "roomId",
                message: format!("'{}' is not a valid room id", raw),
            })?),
        };

        Ok(SessionInput { day, range, room_id })
    }
}

/// Book a weekly session for `course_id`, refusing double-booked rooms.
pub async fn add_class_session(
    catalog: &mut dyn Catalog,
    principal: &Principal,
    course_id: Uuid,
    input: SessionInput,
) -> Result<ClassSessionView, ScheduleError> {
    let course = catalog.course(course_id).await?.ok_or(ScheduleError::CourseNotFound)?;

    let room = match input.room_id {
        None => None,
        Some(room_id) => {
            let room = catalog.room(room_id).await?.ok_or(ScheduleError::RoomNotFound)?;
            if room.campus_id != course.campus_id {
                return Err(ScheduleError::RoomCampusMismatch);
            }

            catalog.lock_room(room_id).await?;
            let existing = catalog.room_sessions(room_id, input.day, course_id).await?;
            let proposal = ProposedSession {
                course_id,
                day: input.day,
                room_id: Some(room_id),
                range: input.range,
            };
            let report = check_conflicts(&proposal, &existing);
            if report.has_conflict() {
                warn!(
                    course = %course.code,
                    room = %room.name,
                    day = %input.day,
                    conflicts = report.conflicts.len(),
                    "Rejected double-booked class time"
                );
                return Err(ScheduleError::Conflict(report.conflicts));
            }
            Some(room)
        }
    };

    let session = catalog
        .insert_class_session(NewClassSession {
            course_id,
            day: input.day,
            start_time: input.range.start(),
            end_time: input.range.end(),
            room_id: input.room_id,
        })
        .await?;
    let view = ClassSessionView { session, room };

    catalog
        .record_audit(&AuditEntry::created(
            principal.id,
            AuditEntity::ClassTime,
            view.session.id.to_string(),
            &view,
        )?)
        .await?;

    info!(course = %course.code, class_time = %view.session.id, day = %input.day, "Created class time");
    Ok(view)
}

/// Remove one of `course_id`'s sessions; returns the removed row.
pub async fn remove_class_session(
    catalog: &mut dyn Catalog,
    principal: &Principal,
    course_id: Uuid,
    class_time_id: Uuid,
) -> Result<ClassSession, ScheduleError> {
    let session = catalog
        .class_session(class_time_id, course_id)
        .await?
        .ok_or(ScheduleError::SessionNotFound)?;

    let course = catalog
        .course(course_id)
        .await?
        .ok_or_else(|| DatabaseError::Corrupt(format!("class_times.course_id: {} has no course", course_id)))?;
    let room = match session.room_id {
        Some(room_id) => catalog.room(room_id).await?,
        None => None,
    };

    catalog.delete_class_session(session.id).await?;
    let snapshot = ClassSessionSnapshot { session, course, room };
    catalog
        .record_audit(&AuditEntry::deleted(
            principal.id,
            AuditEntity::ClassTime,
            snapshot.session.id.to_string(),
            &snapshot,
        )?)
        .await?;

    info!(course = %snapshot.course.code, class_time = %snapshot.session.id, "Deleted class time");
    Ok(snapshot.session)
}
