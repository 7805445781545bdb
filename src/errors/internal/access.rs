use thiserror::Error;

use crate::types::internal::DenyReason;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("User has no faculty assignment")]
    NoFacultyAssignment,

    #[error("Cross-school access: requested {requested}, home school {home_school}")]
    CrossSchoolAccess {
        requested: String,
        home_school: String,
    },

    #[error("Not permitted to {action}")]
    NotPermitted { action: String },
}

impl AccessError {
    pub fn not_permitted(action: impl Into<String>) -> Self {
        Self::NotPermitted {
            action: action.into(),
        }
    }

    /// Error equivalent of a guard denial
    pub fn from_deny(reason: DenyReason, requested: &str, home_school: Option<&str>) -> Self {
        match reason {
            DenyReason::NoFacultyAssignment => Self::NoFacultyAssignment,
            DenyReason::CrossSchoolAccess => Self::CrossSchoolAccess {
                requested: requested.to_string(),
                home_school: home_school.unwrap_or("none").to_string(),
            },
        }
    }
}
