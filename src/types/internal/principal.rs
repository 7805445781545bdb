use crate::types::db::user;
use crate::types::internal::auth::Claims;
use crate::types::internal::school::HomeSchool;

pub const SUPER_ADMIN_ROLE: &str = "Super Admin";
pub const ADMIN_ROLE: &str = "Admin";
pub const EXAM_OFFICE_ROLE: &str = "Exam Office";
pub const LECTURER_ROLE: &str = "Lecturer";
pub const STUDENT_ROLE: &str = "Student";

/// What a principal may do, evaluated once from its role names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Super Admin / Admin: skips every school check
    pub bypass_school_scope: bool,
    pub faculty_admin: bool,
    pub exam_office: bool,
    pub lecturer: bool,
    pub student: bool,
}

impl Capabilities {
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        let mut caps = Self::default();
        for role in roles {
            match role.as_ref() {
                SUPER_ADMIN_ROLE | ADMIN_ROLE => caps.bypass_school_scope = true,
                EXAM_OFFICE_ROLE => caps.exam_office = true,
                LECTURER_ROLE => caps.lecturer = true,
                STUDENT_ROLE => caps.student = true,
                other if other.starts_with(HomeSchool::FACULTY_ADMIN_PREFIX) => {
                    caps.faculty_admin = true
                }
                _ => {}
            }
        }
        caps
    }
}

/// Authenticated user as seen by authorization checks.
///
/// Built once per request from validated token claims and carried in the
/// `RequestContext`.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: String,
    pub code: String,
    pub roles: Vec<String>,
    pub capabilities: Capabilities,
    pub home_school: Option<HomeSchool>,
}

impl Principal {
    /// Build a principal from raw role names and the `schools` field
    pub fn new(
        user_id: impl Into<String>,
        code: impl Into<String>,
        roles: Vec<String>,
        schools: Option<&str>,
    ) -> Self {
        let capabilities = Capabilities::from_roles(&roles);
        let home_school = HomeSchool::derive(&roles, schools);
        Self {
            user_id: user_id.into(),
            code: code.into(),
            roles,
            capabilities,
            home_school,
        }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            code: claims.code.clone(),
            roles: claims.roles.clone(),
            capabilities: Capabilities::from_roles(&claims.roles),
            home_school: claims.home_school.clone().map(HomeSchool::new),
        }
    }

    /// Principal for a stored user, preferring the persisted home school
    pub fn from_user(user: &user::Model) -> Self {
        let mut principal = Self::new(
            user.id.clone(),
            user.code.clone(),
            user.role_names(),
            user.schools.as_deref(),
        );
        if let Some(persisted) = &user.home_school {
            principal.home_school = Some(HomeSchool::new(persisted.clone()));
        }
        principal
    }

    pub fn is_bypass(&self) -> bool {
        self.capabilities.bypass_school_scope
    }

    /// Students may only act on their own enrollments; staff with an
    /// administrative role may act on anyone's.
    pub fn can_manage_enrollments_of(&self, student_code: &str) -> bool {
        let caps = &self.capabilities;
        caps.bypass_school_scope
            || caps.faculty_admin
            || caps.exam_office
            || self.code == student_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn admin_roles_bypass_school_scope() {
        assert!(Capabilities::from_roles(&roles(&["Admin"])).bypass_school_scope);
        assert!(Capabilities::from_roles(&roles(&["Super Admin"])).bypass_school_scope);
        assert!(!Capabilities::from_roles(&roles(&["Faculty Admin - SCES"])).bypass_school_scope);
    }

    #[test]
    fn faculty_admin_capability_comes_from_prefix() {
        let caps = Capabilities::from_roles(&roles(&["Faculty Admin - SBS", "Lecturer"]));
        assert!(caps.faculty_admin);
        assert!(caps.lecturer);
        assert!(!caps.student);
    }

    #[test]
    fn principal_from_claims_uses_persisted_home_school() {
        let claims = Claims {
            sub: "u-1".to_string(),
            code: "LEC001".to_string(),
            roles: roles(&["Lecturer"]),
            home_school: Some("SHS".to_string()),
            exp: 0,
            iat: 0,
            jti: "j-1".to_string(),
        };
        let principal = Principal::from_claims(&claims);
        assert_eq!(principal.home_school, Some(HomeSchool::new("SHS")));
        assert!(principal.capabilities.lecturer);
    }

    #[test]
    fn students_only_manage_their_own_enrollments() {
        let student = Principal::new("u-2", "STU100", roles(&["Student"]), Some("sces"));
        assert!(student.can_manage_enrollments_of("STU100"));
        assert!(!student.can_manage_enrollments_of("STU101"));

        let lecturer = Principal::new("u-3", "LEC002", roles(&["Lecturer"]), Some("sces"));
        assert!(!lecturer.can_manage_enrollments_of("STU100"));

        let exam_office = Principal::new("u-4", "EX001", roles(&["Exam Office"]), None);
        assert!(exam_office.can_manage_enrollments_of("STU100"));
    }
}
