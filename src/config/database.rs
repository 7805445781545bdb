use migration::{AuditMigrator, MigratorTrait, PortalMigrator};
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// Connections to the portal database and the separate audit database
#[derive(Clone)]
pub struct DatabaseConnections {
    pub portal: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    pub fn new(portal: DatabaseConnection, audit: DatabaseConnection) -> Self {
        Self { portal, audit }
    }

    /// Connect both databases. Does not run migrations.
    pub async fn connect(bootstrap_settings: &BootstrapSettings) -> Result<Self, InternalError> {
        let portal = Database::connect(bootstrap_settings.database_url())
            .await
            .map_err(|e| InternalError::database("connect_database", e))?;
        tracing::debug!("Connected to portal database: {}", bootstrap_settings.database_url());

        let audit = Database::connect(bootstrap_settings.audit_database_url())
            .await
            .map_err(|e| InternalError::database("connect_audit_database", e))?;
        tracing::debug!(
            "Connected to audit database: {}",
            bootstrap_settings.audit_database_url()
        );

        Ok(Self { portal, audit })
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        migrate_portal_database(&self.portal).await?;
        migrate_audit_database(&self.audit).await?;
        Ok(())
    }

    pub async fn begin_portal_transaction(&self) -> Result<DatabaseTransaction, InternalError> {
        self.portal
            .begin()
            .await
            .map_err(InternalError::transaction_begin)
    }

    pub async fn commit_transaction(txn: DatabaseTransaction) -> Result<(), InternalError> {
        txn.commit().await.map_err(InternalError::transaction_commit)
    }
}

/// Run pending migrations on the portal database
pub async fn migrate_portal_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    PortalMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Portal database migrations completed");
    Ok(())
}

/// Run pending migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), InternalError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| InternalError::database("run_audit_migrations", e))?;

    tracing::debug!("Audit database migrations completed");
    Ok(())
}
