mod common;

use timetable_portal::coordinators::AccessCoordinator;
use timetable_portal::providers::AccessGuardProvider;
use timetable_portal::types::internal::context::RequestContext;
use timetable_portal::types::internal::{AccessDecision, DenyReason, HomeSchool, Principal};

fn principal(roles: &[&str], schools: Option<&str>) -> Principal {
    Principal::new(
        "u-1",
        "USR001",
        roles.iter().map(|r| r.to_string()).collect(),
        schools,
    )
}

const PATHS: [&str; 6] = [
    "/sces/units",
    "/sbs/units?page=3",
    "/tourism/timetable",
    "/profile",
    "/",
    "/shm",
];

#[test]
fn test_faculty_admin_is_kept_inside_home_school() {
    let guard = AccessGuardProvider::new();
    let fa = principal(&["Faculty Admin - SCES"], None);

    assert_eq!(
        guard.authorize(Some(&fa), "/sbs/units", None),
        AccessDecision::Redirect {
            path: "/sces/units".to_string(),
            message: None,
        }
    );
    assert_eq!(
        guard.authorize(Some(&fa), "/sces/units", None),
        AccessDecision::Allow {
            resolved_school: Some(HomeSchool::new("SCES")),
        }
    );
    assert!(guard.authorize(Some(&fa), "/profile", None).is_allowed());
}

#[test]
fn test_admins_are_allowed_everywhere() {
    let guard = AccessGuardProvider::new();
    for roles in [&["Admin"][..], &["Super Admin"][..], &["Admin", "Lecturer"][..]] {
        let admin = principal(roles, None);
        for path in PATHS {
            assert_eq!(
                guard.authorize(Some(&admin), path, None),
                AccessDecision::Allow {
                    resolved_school: None
                }
            );
            assert!(guard.authorize(Some(&admin), path, Some("shs")).is_allowed());
        }
    }
}

#[test]
fn test_user_without_school_is_never_allowed() {
    let guard = AccessGuardProvider::new();
    for schools in [None, Some(""), Some("   ")] {
        let lecturer = principal(&["Lecturer"], schools);
        for path in PATHS {
            assert!(!guard.authorize(Some(&lecturer), path, None).is_allowed());
            assert_eq!(
                guard.authorize(Some(&lecturer), path, Some("sces")),
                AccessDecision::Deny {
                    status: 403,
                    reason: DenyReason::NoFacultyAssignment,
                }
            );
        }
    }
}

#[test]
fn test_unknown_role_suffix_is_kept_verbatim() {
    let guard = AccessGuardProvider::new();
    let fa = principal(&["Faculty Admin - ENG"], Some("sbs"));

    assert_eq!(
        guard.authorize(Some(&fa), "/profile", None),
        AccessDecision::Allow {
            resolved_school: Some(HomeSchool::new("ENG")),
        }
    );
    assert_eq!(
        guard.authorize(Some(&fa), "/sbs/units", None),
        AccessDecision::Redirect {
            path: "/eng/units".to_string(),
            message: None,
        }
    );
}

#[test]
fn test_guard_is_idempotent() {
    let guard = AccessGuardProvider::new();
    let student = principal(&["Student"], Some("shs"));

    for path in PATHS {
        let first = guard.authorize(Some(&student), path, None);
        let second = guard.authorize(Some(&student), path, None);
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_anonymous_request_is_sent_to_login() {
    let app_data = common::setup_app_data().await;
    let coordinator = AccessCoordinator::new(app_data);

    let decision = coordinator
        .check(&RequestContext::new(), "/sces/units", None)
        .await;

    assert_eq!(
        decision,
        AccessDecision::Redirect {
            path: "/login".to_string(),
            message: None,
        }
    );
}

#[tokio::test]
async fn test_redirects_and_denials_are_audited() {
    let app_data = common::setup_app_data().await;
    let coordinator = AccessCoordinator::new(app_data.clone());
    let ctx = common::ctx_with_roles("FA001", &["Faculty Admin - SCES"], None);

    coordinator.check(&ctx, "/sbs/units", None).await;
    coordinator.check(&ctx, "/units", Some("sbs")).await;
    coordinator.check(&ctx, "/sces/units", None).await;

    let audit = &app_data.stores.audit_store;
    let redirected = audit.events_of_type("access_redirected").await.unwrap();
    let denied = audit.events_of_type("access_denied").await.unwrap();

    assert_eq!(redirected.len(), 1);
    assert_eq!(redirected[0].school.as_deref(), Some("SBS"));
    assert_eq!(redirected[0].actor_id, "id-fa001");
    assert_eq!(denied.len(), 1);
    assert!(denied[0].data.contains("cross_school_access"));
}
