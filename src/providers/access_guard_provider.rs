use crate::types::internal::access::{DASHBOARD_PATH, LOGIN_PATH};
use crate::types::internal::{AccessDecision, DenyReason, GuardMode, HomeSchool, Principal, SchoolCode};

/// Decides whether a principal may reach a school-scoped resource
///
/// Decisions are pure: nothing is read from or written to storage, so the
/// same inputs always give the same answer.
#[derive(Debug, Default, Clone)]
pub struct AccessGuardProvider;

impl AccessGuardProvider {
    pub fn new() -> Self {
        Self
    }

    /// # Arguments
    /// * `principal` - `None` when the request carried no valid token
    /// * `requested_path` - path as requested, query string included
    /// * `explicit_school` - school code from a route parameter, if the
    ///   resource names its school explicitly
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        requested_path: &str,
        explicit_school: Option<&str>,
    ) -> AccessDecision {
        let Some(principal) = principal else {
            return AccessDecision::Redirect {
                path: LOGIN_PATH.to_string(),
                message: None,
            };
        };

        if principal.is_bypass() {
            return AccessDecision::Allow {
                resolved_school: None,
            };
        }

        let mode = GuardMode::from_optional(explicit_school);
        let Some(home_school) = principal.home_school.as_ref() else {
            tracing::info!(user = %principal.code, "User without faculty assignment requested {}", requested_path);
            return match mode {
                GuardMode::PathPrefix => AccessDecision::Redirect {
                    path: DASHBOARD_PATH.to_string(),
                    message: Some(DenyReason::NoFacultyAssignment.message().to_string()),
                },
                GuardMode::ExplicitSchool(_) => AccessDecision::Deny {
                    status: 403,
                    reason: DenyReason::NoFacultyAssignment,
                },
            };
        };

        if home_school.school_code().is_none() {
            tracing::warn!(
                user = %principal.code,
                "Home school '{}' is not a recognised school code",
                home_school
            );
        }

        match mode {
            GuardMode::PathPrefix => Self::authorize_path(home_school, requested_path),
            GuardMode::ExplicitSchool(requested) => {
                if home_school.matches(requested) {
                    AccessDecision::Allow {
                        resolved_school: Some(home_school.clone()),
                    }
                } else {
                    AccessDecision::Deny {
                        status: 403,
                        reason: DenyReason::CrossSchoolAccess,
                    }
                }
            }
        }
    }

    fn authorize_path(home_school: &HomeSchool, requested_path: &str) -> AccessDecision {
        let (path, query) = match requested_path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (requested_path, None),
        };
        let trimmed = path.trim_start_matches('/');
        let (first_segment, rest) = match trimmed.find('/') {
            Some(index) => trimmed.split_at(index),
            None => (trimmed, ""),
        };

        let foreign_school = SchoolCode::parse(first_segment)
            .filter(|_| !first_segment.is_empty())
            .filter(|_| !home_school.matches(first_segment));

        match foreign_school {
            Some(_) => {
                let mut target = format!("/{}{}", home_school.path_segment(), rest);
                if let Some(query) = query {
                    target.push('?');
                    target.push_str(query);
                }
                AccessDecision::Redirect {
                    path: target,
                    message: None,
                }
            }
            None => AccessDecision::Allow {
                resolved_school: Some(home_school.clone()),
            },
        }
    }
}
