//! Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Mutations recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

/// Entity names as they appear in `audit_logs.entity_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEntity {
    ClassTime,
    CoursePrerequisite,
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::ClassTime => "ClassTime",
            AuditEntity::CoursePrerequisite => "CoursePrerequisite",
        }
    }
}
