use std::fmt;

use crate::types::internal::school::HomeSchool;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// How the school being accessed is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode<'a> {
    /// School taken from the first segment of the requested path
    PathPrefix,
    /// School supplied explicitly, e.g. as a route parameter
    ExplicitSchool(&'a str),
}

impl<'a> GuardMode<'a> {
    pub fn from_optional(explicit_school: Option<&'a str>) -> Self {
        match explicit_school {
            Some(school) => GuardMode::ExplicitSchool(school),
            None => GuardMode::PathPrefix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoFacultyAssignment,
    CrossSchoolAccess,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NoFacultyAssignment => "no_faculty_assignment",
            DenyReason::CrossSchoolAccess => "cross_school_access",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NoFacultyAssignment => {
                "Access denied: no faculty assignment. Please contact an administrator."
            }
            DenyReason::CrossSchoolAccess => {
                "Access denied: cross-school access is not permitted."
            }
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a school-scoped access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// `resolved_school` is `None` for admins, who are not tied to a school
    Allow { resolved_school: Option<HomeSchool> },
    Redirect { path: String, message: Option<String> },
    Deny { status: u16, reason: DenyReason },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AccessDecision::Allow { .. } => "allow",
            AccessDecision::Redirect { .. } => "redirect",
            AccessDecision::Deny { .. } => "deny",
        }
    }
}
