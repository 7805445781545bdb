use crate::config::{BootstrapSettings, DatabaseConnections};

/// Run database migrations for the portal and audit databases
///
/// Connects to both databases and runs all pending migrations. It does not
/// initialize AppData, so no secrets are needed.
pub async fn run_migrations(
    bootstrap_settings: &BootstrapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let connections = DatabaseConnections::connect(bootstrap_settings).await?;
    connections.migrate().await?;

    tracing::info!("All migrations completed successfully");
    Ok(())
}
