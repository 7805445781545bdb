mod bootstrap_settings;
mod config_spec;
mod database;
mod enrollment_settings;
mod env_provider;
mod errors;
mod logging;
mod secret_manager;

pub use bootstrap_settings::BootstrapSettings;
pub use config_spec::ConfigSpec;
pub use database::{DatabaseConnections, migrate_audit_database, migrate_portal_database};
pub use enrollment_settings::EnrollmentSettings;
pub use env_provider::{EnvironmentProvider, MockEnvironment, SharedEnvironment, SystemEnvironment};
pub use errors::ApplicationError;
pub use logging::{LoggingError, init_logging};
pub use secret_manager::SecretManager;
