// Test utilities shared by unit tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{AuditMigrator, MigratorTrait, PortalMigrator};
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::{DatabaseConnections, EnrollmentSettings, MockEnvironment, SecretManager};
use crate::stores::{CatalogStore, NewUser};
use crate::types::db::{semester, unit, user};
use crate::types::internal::context::RequestContext;
use crate::types::internal::principal::Principal;
use crate::types::internal::school::{HomeSchool, SchoolCode};

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";

/// Fresh in-memory portal database with migrations applied
pub async fn setup_portal_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    PortalMigrator::up(&db, None)
        .await
        .expect("Failed to run portal migrations");
    db
}

/// Fresh in-memory audit database with migrations applied
pub async fn setup_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");
    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");
    db
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    let env = MockEnvironment::empty()
        .with_var("JWT_SECRET", TEST_JWT_SECRET)
        .shared();
    Arc::new(SecretManager::from_env_provider(env).expect("Failed to build test SecretManager"))
}

/// AppData over fresh databases with the default group policy
pub async fn setup_app_data() -> Arc<AppData> {
    let connections = DatabaseConnections::new(setup_portal_db().await, setup_audit_db().await);
    Arc::new(AppData::new(
        connections,
        test_secret_manager(),
        EnrollmentSettings::default(),
    ))
}

/// An SCES unit and a semester, optionally with a per-unit capacity
pub async fn seed_unit_and_semester(
    db: &DatabaseConnection,
    group_capacity: Option<i32>,
) -> (unit::Model, semester::Model) {
    let store = CatalogStore::new();
    let unit = store
        .create_unit(db, "ICS 2201", "Operating Systems", SchoolCode::Sces, group_capacity)
        .await
        .expect("Failed to seed unit");
    let semester = store
        .create_semester(db, "2025/2026 Semester 1")
        .await
        .expect("Failed to seed semester");
    (unit, semester)
}

pub fn new_user(code: &str, roles: &[&str], schools: Option<&str>) -> NewUser {
    NewUser {
        code: code.to_string(),
        first_name: "Test".to_string(),
        last_name: code.to_string(),
        email: format!("{}@example.ac.ke", code.to_lowercase()),
        schools: schools.map(str::to_string),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// In-memory user row, not persisted
pub fn test_user(code: &str, roles: &[&str], schools: Option<&str>) -> user::Model {
    let role_names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    user::Model {
        id: format!("id-{}", code.to_lowercase()),
        code: code.to_string(),
        first_name: "Test".to_string(),
        last_name: code.to_string(),
        email: format!("{}@example.ac.ke", code.to_lowercase()),
        roles: serde_json::to_string(&role_names).expect("roles serialize"),
        schools: schools.map(str::to_string),
        home_school: HomeSchool::derive(&role_names, schools).map(|h| h.as_str().to_string()),
        created_at: 0,
        updated_at: 0,
    }
}

/// Authenticated API context for a user with the given roles
pub fn ctx_for(code: &str, roles: &[&str], schools: Option<&str>) -> RequestContext {
    RequestContext::new().with_principal(Principal::from_user(&test_user(code, roles, schools)))
}
