use std::sync::Arc;

use crate::AppData;
use crate::audit::AuditLogger;
use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::providers::AccessGuardProvider;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AccessDecision, HomeSchool, SchoolCode};

/// Runs the school-scoped guard for a request and audits what it refused
pub struct AccessCoordinator {
    access_guard_provider: Arc<AccessGuardProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl AccessCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            access_guard_provider: Arc::clone(&app_data.providers.access_guard_provider),
            audit_logger: Arc::clone(&app_data.audit_logger),
        }
    }

    /// Guard decision for the request's principal
    ///
    /// Redirects and denials are logged and audited; allowed requests are not.
    pub async fn check(
        &self,
        ctx: &RequestContext,
        requested_path: &str,
        explicit_school: Option<&str>,
    ) -> AccessDecision {
        let decision =
            self.access_guard_provider
                .authorize(ctx.principal(), requested_path, explicit_school);

        match &decision {
            AccessDecision::Allow { .. } => {
                tracing::debug!(request_id = %ctx.request_id, "Access allowed to {}", requested_path);
            }
            AccessDecision::Redirect { path, .. } => {
                tracing::info!(
                    request_id = %ctx.request_id,
                    actor = %ctx.actor_id,
                    "Redirecting {} to {}",
                    requested_path,
                    path
                );
            }
            AccessDecision::Deny { reason, .. } => {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    actor = %ctx.actor_id,
                    "Access denied to {}: {}",
                    requested_path,
                    reason.code()
                );
            }
        }

        let school = explicit_school.or_else(|| {
            requested_path
                .trim_start_matches('/')
                .split(['/', '?'])
                .next()
                .filter(|segment| SchoolCode::parse(segment).is_some())
        });
        if let Err(e) = self
            .audit_logger
            .log_access_decision(ctx, requested_path, school, &decision)
            .await
        {
            tracing::error!("Failed to audit access decision: {}", e);
        }

        decision
    }

    /// Explicit-school check for API routes
    ///
    /// # Returns
    /// The resolved home school, or `None` for admins
    pub async fn require_school(
        &self,
        ctx: &RequestContext,
        requested_path: &str,
        school: &str,
    ) -> Result<Option<HomeSchool>, InternalError> {
        match self.check(ctx, requested_path, Some(school)).await {
            AccessDecision::Allow { resolved_school } => Ok(resolved_school),
            AccessDecision::Deny { reason, .. } => {
                let home = ctx
                    .principal()
                    .and_then(|p| p.home_school.as_ref())
                    .map(|h| h.as_str());
                Err(AccessError::from_deny(reason, &school.to_uppercase(), home).into())
            }
            // Only an anonymous caller is redirected in explicit mode
            AccessDecision::Redirect { .. } => Err(AccessError::Unauthenticated.into()),
        }
    }
}
