use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::{DatabaseConnections, EnrollmentSettings, SecretManager, SharedEnvironment};
use crate::errors::InternalError;
use crate::providers::{AccessGuardProvider, EnrollmentProvider, TokenProvider};
use crate::stores::{AuditStore, CatalogStore, EnrollmentStore, UserStore};

/// Stores shared by every coordinator
pub struct Stores {
    pub user_store: Arc<UserStore>,
    pub catalog_store: Arc<CatalogStore>,
    pub enrollment_store: Arc<EnrollmentStore>,
    pub audit_store: Arc<AuditStore>,
}

pub struct Providers {
    pub token_provider: Arc<TokenProvider>,
    pub access_guard_provider: Arc<AccessGuardProvider>,
    pub enrollment_provider: Arc<EnrollmentProvider>,
}

/// Application data created once at startup and shared by coordinators
///
/// ```text
/// main.rs
///   ↓
/// AppData::init(connections, env)
///   ├─ secret_manager, enrollment_settings (from the environment)
///   ├─ stores    (user, catalog, enrollment, audit)
///   ├─ providers (token, access guard, enrollment)
///   └─ audit_logger
///   ↓ wrapped in Arc<AppData>
///   ├─ AccessCoordinator::new(app_data)
///   ├─ EnrollmentCoordinator::new(app_data)
///   └─ AdminCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub secret_manager: Arc<SecretManager>,
    pub enrollment_settings: EnrollmentSettings,
    pub audit_logger: Arc<AuditLogger>,
    pub stores: Stores,
    pub providers: Providers,
}

impl AppData {
    /// Load secrets and enrollment settings, then wire stores and providers
    ///
    /// Connections must already be migrated.
    pub async fn init(
        connections: DatabaseConnections,
        env_provider: SharedEnvironment,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let secret_manager = Arc::new(SecretManager::from_env_provider(env_provider.clone())?);
        let enrollment_settings = EnrollmentSettings::from_env_provider(env_provider)?;
        tracing::debug!(
            "Enrollment groups {:?} with capacity {}",
            enrollment_settings.group_policy().labels(),
            enrollment_settings.group_policy().capacity()
        );

        let app_data = Self::new(connections, secret_manager, enrollment_settings);
        tracing::info!("AppData initialization complete");
        Ok(app_data)
    }

    pub fn new(
        connections: DatabaseConnections,
        secret_manager: Arc<SecretManager>,
        enrollment_settings: EnrollmentSettings,
    ) -> Self {
        let audit_store = Arc::new(AuditStore::new(connections.audit.clone()));
        let stores = Stores {
            user_store: Arc::new(UserStore::new()),
            catalog_store: Arc::new(CatalogStore::new()),
            enrollment_store: Arc::new(EnrollmentStore::new()),
            audit_store: audit_store.clone(),
        };

        let providers = Providers {
            token_provider: Arc::new(TokenProvider::new(secret_manager.clone())),
            access_guard_provider: Arc::new(AccessGuardProvider::new()),
            enrollment_provider: Arc::new(EnrollmentProvider::new(
                stores.enrollment_store.clone(),
                stores.catalog_store.clone(),
                enrollment_settings.group_policy().clone(),
            )),
        };

        Self {
            connections,
            secret_manager,
            enrollment_settings,
            audit_logger: Arc::new(AuditLogger::new(audit_store)),
            stores,
            providers,
        }
    }
}
