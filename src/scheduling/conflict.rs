use uuid::Uuid;

use super::{Day, TimeRange};
use crate::database::models::ClassSession;

/// A session a caller wants to add to `course_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedSession {
    pub course_id: Uuid,
    pub day: Day,
    pub room_id: Option<Uuid>,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub conflicts: Vec<ClassSession>,
}

impl ConflictReport {
    pub fn has_conflict(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Collect every existing session the proposal would double-book.
///
/// A session conflicts when it is in the same room, on the same day, belongs
/// to a different course, and its time range overlaps the proposal (touching
/// boundaries are fine). A proposal without a room never conflicts.
pub fn check_conflicts<'a, I>(proposed: &ProposedSession, existing: I) -> ConflictReport
where
    I: IntoIterator<Item = &'a ClassSession>,
{
    let Some(room_id) = proposed.room_id else {
        return ConflictReport::default();
    };

    let conflicts = existing
        .into_iter()
        .filter(|session| session.room_id == Some(room_id))
        .filter(|session| session.day == proposed.day)
        .filter(|session| session.course_id != proposed.course_id)
        .filter(|session| proposed.range.overlaps(&session.time_range()))
        .cloned()
        .collect();

    ConflictReport { conflicts }
}
