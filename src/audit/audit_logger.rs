use std::sync::Arc;

use serde_json::json;

use crate::audit::AuditBuilder;
use crate::errors::InternalError;
use crate::stores::audit_store::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::audit_intent::AuditIntent;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AccessDecision, DenyReason};

/// Writes audit events for the portal
///
/// Every event carries the actor, request id, source and client address of
/// the `RequestContext` it was recorded under.
pub struct AuditLogger {
    pub audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    /// Builder for events without a dedicated method
    pub fn builder(&self, event_type: impl Into<EventType>) -> AuditBuilder {
        AuditBuilder::new(self.audit_store.clone(), event_type)
    }

    fn event(ctx: &RequestContext, event_type: EventType) -> AuditEvent {
        let mut event = AuditEvent::new(event_type);
        event.actor_id = ctx.actor_id.clone();
        event.request_id = Some(ctx.request_id.to_string());
        event.source = ctx.source.as_str().to_string();
        event.ip_address = ctx.ip_address.map(|ip| ip.to_string());
        event
    }

    /// Write the intents a provider returned once its transaction committed
    pub async fn log_intents(
        &self,
        ctx: &RequestContext,
        school: Option<&str>,
        intents: Vec<AuditIntent>,
    ) -> Result<(), InternalError> {
        for intent in intents {
            let mut event = Self::event(ctx, intent.event_type);
            event.school = school.map(str::to_string);
            event.data = intent.data;
            event
                .data
                .insert("recorded_at".to_string(), json!(intent.timestamp.to_rfc3339()));
            self.audit_store.write_event(event).await?;
        }
        Ok(())
    }

    /// Audit writes never fail the operation that triggered them
    pub async fn record_intents(&self, ctx: &RequestContext, school: Option<&str>, intents: Vec<AuditIntent>) {
        if let Err(e) = self.log_intents(ctx, school, intents).await {
            tracing::error!(request_id = %ctx.request_id, "Failed to write audit events: {}", e);
        }
    }

    pub async fn log_enrollment_rejected(
        &self,
        ctx: &RequestContext,
        school: Option<&str>,
        student_code: &str,
        unit_id: i32,
        semester_id: i32,
        reason: &str,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::EnrollmentRejected);
        event.school = school.map(str::to_string);
        event.data.insert("student_code".to_string(), json!(student_code));
        event.data.insert("unit_id".to_string(), json!(unit_id));
        event.data.insert("semester_id".to_string(), json!(semester_id));
        event.data.insert("reason".to_string(), json!(reason));

        self.audit_store.write_event(event).await
    }

    /// Record a guard decision; allowed requests are not audited
    pub async fn log_access_decision(
        &self,
        ctx: &RequestContext,
        requested_path: &str,
        requested_school: Option<&str>,
        decision: &AccessDecision,
    ) -> Result<(), InternalError> {
        let mut event = match decision {
            AccessDecision::Allow { .. } => return Ok(()),
            AccessDecision::Redirect { path, message } => {
                let mut event = Self::event(ctx, EventType::AccessRedirected);
                event.data.insert("redirect_path".to_string(), json!(path));
                if let Some(message) = message {
                    event.data.insert("message".to_string(), json!(message));
                }
                event
            }
            AccessDecision::Deny { status, reason } => {
                let mut event = Self::event(ctx, EventType::AccessDenied);
                event.data.insert("http_status".to_string(), json!(status));
                event.data.insert("reason".to_string(), json!(reason.code()));
                event
            }
        };

        event.data.insert("requested_path".to_string(), json!(requested_path));
        event.school = requested_school.map(str::to_uppercase);
        if let Some(home) = ctx.principal().and_then(|p| p.home_school.as_ref()) {
            event.data.insert("home_school".to_string(), json!(home.as_str()));
        }

        self.audit_store.write_event(event).await
    }

    /// Denial raised outside the guard, e.g. a student reading someone else's enrollments
    pub async fn log_access_denied(
        &self,
        ctx: &RequestContext,
        action: &str,
        reason: Option<DenyReason>,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::AccessDenied);
        event.data.insert("action".to_string(), json!(action));
        event.data.insert(
            "reason".to_string(),
            json!(reason.map(|r| r.code()).unwrap_or("not_permitted")),
        );

        self.audit_store.write_event(event).await
    }

    pub async fn log_user_created(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        code: &str,
        home_school: Option<&str>,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::UserCreated);
        event.school = home_school.map(str::to_string);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("code".to_string(), json!(code));

        self.audit_store.write_event(event).await
    }

    pub async fn log_roles_assigned(
        &self,
        ctx: &RequestContext,
        code: &str,
        old_roles: &[String],
        new_roles: &[String],
        home_school: Option<&str>,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::RolesAssigned);
        event.school = home_school.map(str::to_string);
        event.data.insert("code".to_string(), json!(code));
        event.data.insert("old_roles".to_string(), json!(old_roles));
        event.data.insert("new_roles".to_string(), json!(new_roles));

        self.audit_store.write_event(event).await
    }

    pub async fn log_token_issued(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        jwt_id: &str,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::TokenIssued);
        event.data.insert("target_user_id".to_string(), json!(user_id));
        event.data.insert("jwt_id".to_string(), json!(jwt_id));

        self.audit_store.write_event(event).await
    }

    /// # Arguments
    /// * `args` - Command arguments, without secrets
    pub async fn log_cli_session_start(
        &self,
        ctx: &RequestContext,
        command_name: &str,
        args: Vec<String>,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::CliSessionStart);
        event.data.insert("command_name".to_string(), json!(command_name));
        event.data.insert("args".to_string(), json!(args));

        self.audit_store.write_event(event).await
    }

    pub async fn log_cli_session_end(
        &self,
        ctx: &RequestContext,
        command_name: &str,
        success: bool,
        error_message: Option<String>,
    ) -> Result<(), InternalError> {
        let mut event = Self::event(ctx, EventType::CliSessionEnd);
        event.data.insert("command_name".to_string(), json!(command_name));
        event.data.insert("success".to_string(), json!(success));
        if let Some(error) = error_message {
            event.data.insert("error_message".to_string(), json!(error));
        }

        self.audit_store.write_event(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_audit_db;
    use crate::types::internal::principal::Principal;

    async fn logger() -> AuditLogger {
        AuditLogger::new(Arc::new(AuditStore::new(setup_audit_db().await)))
    }

    fn faculty_admin_ctx() -> RequestContext {
        RequestContext::new().with_principal(Principal::new(
            "user-1",
            "FA001",
            vec!["Faculty Admin - SCES".to_string()],
            None,
        ))
    }

    #[tokio::test]
    async fn test_allow_decisions_are_not_recorded() {
        let logger = logger().await;
        let ctx = faculty_admin_ctx();

        logger
            .log_access_decision(&ctx, "/sces/units", None, &AccessDecision::Allow { resolved_school: None })
            .await
            .unwrap();

        assert!(logger.audit_store.events_of_type("access_denied").await.unwrap().is_empty());
        assert!(logger.audit_store.events_of_type("access_redirected").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_is_recorded_with_home_school() {
        let logger = logger().await;
        let ctx = faculty_admin_ctx();
        let decision = AccessDecision::Redirect {
            path: "/sces/units".to_string(),
            message: None,
        };

        logger
            .log_access_decision(&ctx, "/sbs/units", Some("sbs"), &decision)
            .await
            .unwrap();

        let events = logger.audit_store.events_of_type("access_redirected").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor_id, "user-1");
        assert_eq!(events[0].school.as_deref(), Some("SBS"));
        let data: serde_json::Value = serde_json::from_str(&events[0].data).unwrap();
        assert_eq!(data["redirect_path"], "/sces/units");
        assert_eq!(data["home_school"], "SCES");
    }

    #[tokio::test]
    async fn test_intents_are_written_in_order() {
        let logger = logger().await;
        let ctx = RequestContext::for_system("seed");
        let intents = vec![
            AuditIntent::new(EventType::EnrollmentCreated).with_field("student_code", "S1"),
            AuditIntent::new(EventType::EnrollmentCreated).with_field("student_code", "S2"),
        ];

        logger.log_intents(&ctx, Some("SCES"), intents).await.unwrap();

        let events = logger.audit_store.events_of_type("enrollment_created").await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].data.contains("S1"));
        assert!(events[1].data.contains("S2"));
        assert_eq!(events[0].source, "System");
    }

    #[tokio::test]
    async fn test_cli_session_events() {
        let logger = logger().await;
        let ctx = RequestContext::for_cli("migrate");

        logger.log_cli_session_start(&ctx, "migrate", vec![]).await.unwrap();
        logger
            .log_cli_session_end(&ctx, "migrate", false, Some("boom".to_string()))
            .await
            .unwrap();

        let ends = logger.audit_store.events_of_type("cli_session_end").await.unwrap();
        assert_eq!(ends.len(), 1);
        assert!(ends[0].data.contains("boom"));
    }
}
