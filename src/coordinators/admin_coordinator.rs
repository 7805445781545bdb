use std::sync::Arc;

use crate::AppData;
use crate::audit::AuditLogger;
use crate::config::DatabaseConnections;
use crate::errors::InternalError;
use crate::providers::TokenProvider;
use crate::stores::{CatalogStore, NewUser, UserStore};
use crate::types::db::{semester, unit, user};
use crate::types::internal::context::RequestContext;
use crate::types::internal::school::SchoolCode;

/// User, role and catalog administration used by the CLI
pub struct AdminCoordinator {
    connections: DatabaseConnections,
    user_store: Arc<UserStore>,
    catalog_store: Arc<CatalogStore>,
    token_provider: Arc<TokenProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl AdminCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            connections: app_data.connections.clone(),
            user_store: Arc::clone(&app_data.stores.user_store),
            catalog_store: Arc::clone(&app_data.stores.catalog_store),
            token_provider: Arc::clone(&app_data.providers.token_provider),
            audit_logger: Arc::clone(&app_data.audit_logger),
        }
    }

    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        new_user: NewUser,
    ) -> Result<user::Model, InternalError> {
        let created = self
            .user_store
            .create_user(&self.connections.portal, new_user)
            .await?;
        tracing::info!("Created user {}", created.code);

        if let Err(e) = self
            .audit_logger
            .log_user_created(ctx, &created.id, &created.code, created.home_school.as_deref())
            .await
        {
            tracing::error!("Failed to audit user creation: {}", e);
        }
        Ok(created)
    }

    /// Replace a user's roles; the home school is re-derived and persisted
    pub async fn assign_roles(
        &self,
        ctx: &RequestContext,
        code: &str,
        roles: Vec<String>,
    ) -> Result<user::Model, InternalError> {
        let txn = self.connections.begin_portal_transaction().await?;
        let old_roles = self.user_store.get_by_code(&txn, code).await?.role_names();
        let updated = self.user_store.assign_roles(&txn, code, roles).await?;
        DatabaseConnections::commit_transaction(txn).await?;

        let new_roles = updated.role_names();
        tracing::info!(
            "Roles of {} set to {:?}, home school {:?}",
            updated.code,
            new_roles,
            updated.home_school
        );

        if let Err(e) = self
            .audit_logger
            .log_roles_assigned(ctx, &updated.code, &old_roles, &new_roles, updated.home_school.as_deref())
            .await
        {
            tracing::error!("Failed to audit role assignment: {}", e);
        }
        Ok(updated)
    }

    /// Issue an access token for a user
    ///
    /// # Returns
    /// Tuple of (encoded JWT, JWT ID)
    pub async fn issue_token(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<(String, String), InternalError> {
        let user = self
            .user_store
            .get_by_code(&self.connections.portal, code)
            .await?;
        let (token, jti) = self.token_provider.generate_jwt(&user)?;

        if let Err(e) = self.audit_logger.log_token_issued(ctx, &user.id, &jti).await {
            tracing::error!("Failed to audit token issuance: {}", e);
        }
        Ok((token, jti))
    }

    pub async fn create_unit(
        &self,
        ctx: &RequestContext,
        code: &str,
        name: &str,
        school: SchoolCode,
        group_capacity: Option<i32>,
    ) -> Result<unit::Model, InternalError> {
        let created = self
            .catalog_store
            .create_unit(&self.connections.portal, code, name, school, group_capacity)
            .await?;

        if let Err(e) = self
            .audit_logger
            .builder("unit_created")
            .with_context(ctx)
            .school(created.school.clone())
            .add_field("unit_id", created.id)
            .add_field("code", &created.code)
            .add_field("group_capacity", created.group_capacity)
            .write()
            .await
        {
            tracing::error!("Failed to audit unit creation: {}", e);
        }
        Ok(created)
    }

    pub async fn create_semester(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<semester::Model, InternalError> {
        let created = self
            .catalog_store
            .create_semester(&self.connections.portal, name)
            .await?;

        if let Err(e) = self
            .audit_logger
            .builder("semester_created")
            .with_context(ctx)
            .add_field("semester_id", created.id)
            .add_field("name", &created.name)
            .write()
            .await
        {
            tracing::error!("Failed to audit semester creation: {}", e);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{new_user, setup_app_data};

    #[tokio::test]
    async fn test_assign_roles_persists_home_school_and_audits() {
        let app_data = setup_app_data().await;
        let coordinator = AdminCoordinator::new(app_data.clone());
        let ctx = RequestContext::for_cli("assign-roles");

        coordinator.create_user(&ctx, new_user("L1", &["Lecturer"], Some("shs"))).await.unwrap();
        let updated = coordinator
            .assign_roles(&ctx, "L1", vec!["Faculty Admin - TOURISM".to_string()])
            .await
            .unwrap();

        assert_eq!(updated.home_school.as_deref(), Some("TOURISM"));
        let events = app_data.stores.audit_store.events_of_type("roles_assigned").await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].data.contains("Lecturer"));
        assert_eq!(events[0].school.as_deref(), Some("TOURISM"));
    }

    #[tokio::test]
    async fn test_issued_token_validates() {
        let app_data = setup_app_data().await;
        let coordinator = AdminCoordinator::new(app_data.clone());
        let ctx = RequestContext::for_cli("issue-token");

        coordinator
            .create_user(&ctx, new_user("FA1", &["Faculty Admin - SLS"], None))
            .await
            .unwrap();
        let (token, jti) = coordinator.issue_token(&ctx, "FA1").await.unwrap();

        let claims = app_data.providers.token_provider.validate_jwt(&token).unwrap();
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.home_school.as_deref(), Some("SLS"));
    }

    #[tokio::test]
    async fn test_issue_token_for_unknown_user_fails() {
        let app_data = setup_app_data().await;
        let coordinator = AdminCoordinator::new(app_data);

        let result = coordinator
            .issue_token(&RequestContext::for_cli("issue-token"), "GHOST")
            .await;
        assert!(result.is_err());
    }
}
