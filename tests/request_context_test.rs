mod common;

use std::net::IpAddr;

use poem::Request;
use poem_openapi::auth::Bearer;
use timetable_portal::errors::InternalError;
use timetable_portal::errors::internal::CredentialError;
use timetable_portal::providers::TokenProvider;
use timetable_portal::types::internal::HomeSchool;
use timetable_portal::types::internal::context::{RequestContext, RequestSource};

#[test]
fn test_request_context_new_defaults_to_api_source() {
    let ctx = RequestContext::new();

    assert_eq!(ctx.source, RequestSource::API);
    assert_eq!(ctx.actor_id, "unknown");
    assert!(!ctx.authenticated);
    assert!(ctx.claims.is_none());
    assert!(ctx.principal().is_none());
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("assign-roles");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.actor_id, "cli:assign-roles");
    assert!(!ctx.authenticated);
}

#[test]
fn test_request_context_for_system() {
    let ctx = RequestContext::for_system("migrate");

    assert_eq!(ctx.source, RequestSource::System);
    assert_eq!(ctx.actor_id, "system:migrate");
    assert!(ctx.ip_address.is_none());
}

#[test]
fn test_validate_request_builds_principal_from_token() {
    let token_provider = TokenProvider::new(common::test_secret_manager());
    let user = common::unpersisted_user("FA001", &["Faculty Admin - SHS", "Lecturer"], None);
    let (token, jti) = token_provider.generate_jwt(&user).unwrap();

    let req = Request::builder()
        .header("Authorization", format!("Bearer {}", token))
        .header("X-Forwarded-For", "10.0.0.7, 192.168.1.1")
        .finish();
    let ctx = RequestContext::validate_request(&req, &token_provider).unwrap();

    assert!(ctx.authenticated);
    assert_eq!(ctx.actor_id, user.id);
    assert_eq!(ctx.claims.as_ref().map(|c| c.jti.as_str()), Some(jti.as_str()));
    assert_eq!(ctx.ip_address, Some("10.0.0.7".parse::<IpAddr>().unwrap()));

    let principal = ctx.principal().unwrap();
    assert_eq!(principal.home_school, Some(HomeSchool::new("SHS")));
    assert!(principal.capabilities.faculty_admin);
    assert!(principal.capabilities.lecturer);
}

#[test]
fn test_validate_request_without_token_is_anonymous() {
    let token_provider = TokenProvider::new(common::test_secret_manager());
    let req = Request::builder().header("X-Real-IP", "172.16.0.4").finish();

    let ctx = RequestContext::validate_request(&req, &token_provider).unwrap();

    assert!(!ctx.authenticated);
    assert!(ctx.principal().is_none());
    assert_eq!(ctx.ip_address, Some("172.16.0.4".parse::<IpAddr>().unwrap()));
}

#[test]
fn test_validate_request_rejects_expired_token() {
    let token_provider =
        TokenProvider::new(common::test_secret_manager()).with_expiration_minutes(-5);
    let user = common::unpersisted_user("STU001", &["Student"], Some("sces"));
    let (token, _) = token_provider.generate_jwt(&user).unwrap();

    let req = Request::builder()
        .header("Authorization", format!("Bearer {}", token))
        .finish();

    assert!(matches!(
        RequestContext::validate_request(&req, &token_provider),
        Err(InternalError::Credential(CredentialError::ExpiredToken(_)))
    ));
}

#[test]
fn test_from_bearer_uses_the_given_token() {
    let token_provider = TokenProvider::new(common::test_secret_manager());
    let user = common::unpersisted_user("EX001", &["Exam Office"], Some("sbs"));
    let (token, _) = token_provider.generate_jwt(&user).unwrap();

    let req = Request::builder().header("X-Real-IP", "10.1.2.3").finish();
    let ctx = RequestContext::from_bearer(&req, &Bearer { token }, &token_provider).unwrap();

    assert!(ctx.authenticated);
    assert_eq!(ctx.actor_id, user.id);
    assert_eq!(ctx.ip_address, Some("10.1.2.3".parse::<IpAddr>().unwrap()));
    assert_eq!(
        ctx.principal().and_then(|p| p.home_school.clone()),
        Some(HomeSchool::new("SBS"))
    );
}
