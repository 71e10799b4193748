//! Class session scheduling: weekdays, time parsing and room conflict checks.

pub mod conflict;
pub mod day;
pub mod time;

pub use conflict::{check_conflicts, ConflictReport, ProposedSession};
pub use day::{Day, UnknownDay};
pub use time::{parse_time_of_day, TimeError, TimeRange};
