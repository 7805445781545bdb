// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use migration::{AuditMigrator, MigratorTrait, PortalMigrator};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;
use timetable_portal::AppData;
use timetable_portal::config::{DatabaseConnections, MockEnvironment, SecretManager};
use timetable_portal::stores::CatalogStore;
use timetable_portal::types::db::{semester, unit, user};
use timetable_portal::types::internal::SchoolCode;
use timetable_portal::types::internal::context::RequestContext;
use timetable_portal::types::internal::principal::Principal;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Creates a test portal database with migrations applied
pub async fn setup_test_portal_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    PortalMigrator::up(&db, None)
        .await
        .expect("Failed to run portal migrations");

    db
}

/// Creates a test audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");

    db
}

/// AppData over fresh databases, built through the same path as startup
pub async fn setup_app_data_with(vars: &[(&str, &str)]) -> Arc<AppData> {
    let connections =
        DatabaseConnections::new(setup_test_portal_db().await, setup_test_audit_db().await);
    let env = MockEnvironment::empty()
        .with_var("JWT_SECRET", TEST_JWT_SECRET)
        .with_vars(vars)
        .shared();

    Arc::new(
        AppData::init(connections, env)
            .await
            .expect("Failed to initialize AppData"),
    )
}

pub async fn setup_app_data() -> Arc<AppData> {
    setup_app_data_with(&[]).await
}

/// AppData whose portal database is a SQLite file behind a pool of several
/// connections, so transactions from concurrent tasks really overlap.
///
/// The returned directory holds the database file; keep it alive for the
/// duration of the test.
pub async fn setup_file_backed_app_data(vars: &[(&str, &str)]) -> (Arc<AppData>, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("portal.db").display());

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(8)
        .min_connections(2)
        .sqlx_logging(false);
    let portal = Database::connect(options)
        .await
        .expect("Failed to open file-backed portal database");
    PortalMigrator::up(&portal, None)
        .await
        .expect("Failed to run portal migrations");

    let connections = DatabaseConnections::new(portal, setup_test_audit_db().await);
    let env = MockEnvironment::empty()
        .with_var("JWT_SECRET", TEST_JWT_SECRET)
        .with_vars(vars)
        .shared();
    let app_data = AppData::init(connections, env)
        .await
        .expect("Failed to initialize AppData");

    (Arc::new(app_data), dir)
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    let env = MockEnvironment::empty()
        .with_var("JWT_SECRET", TEST_JWT_SECRET)
        .shared();
    Arc::new(SecretManager::from_env_provider(env).expect("Failed to build SecretManager"))
}

/// Seeds one SCES unit and one semester
pub async fn seed_catalog(
    db: &DatabaseConnection,
    group_capacity: Option<i32>,
) -> (unit::Model, semester::Model) {
    let store = CatalogStore::new();
    let unit = store
        .create_unit(db, "ICS 2305", "Database Systems", SchoolCode::Sces, group_capacity)
        .await
        .expect("Failed to create unit");
    let semester = store
        .create_semester(db, "2025/2026 Semester 2")
        .await
        .expect("Failed to create semester");
    (unit, semester)
}

/// Context for a caller that never touches the user table
pub fn ctx_with_roles(code: &str, roles: &[&str], schools: Option<&str>) -> RequestContext {
    let roles = roles.iter().map(|r| r.to_string()).collect();
    RequestContext::new().with_principal(Principal::new(
        format!("id-{}", code.to_lowercase()),
        code,
        roles,
        schools,
    ))
}

pub fn unpersisted_user(code: &str, roles: &[&str], schools: Option<&str>) -> user::Model {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    let principal = Principal::new(format!("id-{}", code.to_lowercase()), code, roles.clone(), schools);
    user::Model {
        id: principal.user_id,
        code: code.to_string(),
        first_name: "Test".to_string(),
        last_name: code.to_string(),
        email: format!("{}@example.ac.ke", code.to_lowercase()),
        roles: serde_json::to_string(&roles).expect("roles serialize"),
        schools: schools.map(str::to_string),
        home_school: principal.home_school.map(|h| h.as_str().to_string()),
        created_at: 0,
        updated_at: 0,
    }
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
///
/// Environment variables are process-global, so tests that modify them
/// must run serially to avoid race conditions.
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());
