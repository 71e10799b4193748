pub mod prerequisites;
pub mod schedule;

pub use prerequisites::{add_prerequisite, remove_prerequisite, AddPrerequisiteRequest, PrerequisiteError};
pub use schedule::{
    add_class_session, remove_class_session, CreateClassSessionRequest, ScheduleError, SessionInput,
};
