use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Builder for custom audit events
///
/// Sensitive values are stored as SHA-256 digests so related events can be
/// correlated without keeping the raw value.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use timetable_portal::audit::AuditBuilder;
/// # use timetable_portal::stores::AuditStore;
/// # use timetable_portal::types::internal::context::RequestContext;
/// # async fn example(store: Arc<AuditStore>, ctx: &RequestContext) {
/// let _ = AuditBuilder::new(store, "timetable_exported")
///     .with_context(ctx)
///     .school("SCES")
///     .add_field("semester_id", 4)
///     .add_sensitive("email", "registrar@example.ac.ke")
///     .write()
///     .await;
/// # }
/// ```
pub struct AuditBuilder {
    event: AuditEvent,
    store: Arc<AuditStore>,
}

impl AuditBuilder {
    pub fn new(store: Arc<AuditStore>, event_type: impl Into<EventType>) -> Self {
        Self {
            event: AuditEvent::new(event_type.into()),
            store,
        }
    }

    /// Copy actor, request id, source and client address from the context
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.event.actor_id = ctx.actor_id.clone();
        self.event.request_id = Some(ctx.request_id.to_string());
        self.event.source = ctx.source.as_str().to_string();
        self.event.ip_address = ctx.ip_address.map(|ip| ip.to_string());
        if let Some(claims) = &ctx.claims {
            self.event.data.insert("jwt_id".to_string(), json!(claims.jti));
        }
        self
    }

    pub fn actor_id(mut self, id: impl Into<String>) -> Self {
        self.event.actor_id = id.into();
        self
    }

    pub fn school(mut self, school: impl Into<String>) -> Self {
        self.event.school = Some(school.into());
        self
    }

    /// Add a field; values that fail to serialize are skipped
    pub fn add_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.event.data.insert(key.into(), json_value);
        }
        self
    }

    pub fn add_fields(mut self, fields: HashMap<String, serde_json::Value>) -> Self {
        self.event.data.extend(fields);
        self
    }

    /// Add a field as `sha256:<hex>` of its JSON representation
    pub fn add_sensitive(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(&value) {
            let digest = Sha256::digest(json_value.to_string().as_bytes());
            self.event
                .data
                .insert(key.into(), json!(format!("sha256:{:x}", digest)));
        }
        self
    }

    pub fn build(self) -> AuditEvent {
        self.event
    }

    pub async fn write(self) -> Result<(), InternalError> {
        let store = self.store.clone();
        store.write_event(self.build()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_audit_db;

    #[tokio::test]
    async fn test_builder_copies_context() {
        let store = Arc::new(AuditStore::new(setup_audit_db().await));
        let ctx = RequestContext::for_cli("assign-roles");

        let event = AuditBuilder::new(store, EventType::RolesAssigned)
            .with_context(&ctx)
            .school("SCES")
            .add_field("roles", vec!["Lecturer"])
            .build();

        assert_eq!(event.actor_id, "cli:assign-roles");
        assert_eq!(event.source, "CLI");
        assert_eq!(event.request_id, Some(ctx.request_id.to_string()));
        assert_eq!(event.school.as_deref(), Some("SCES"));
        assert_eq!(event.data["roles"], json!(["Lecturer"]));
    }

    #[tokio::test]
    async fn test_sensitive_fields_are_hashed_consistently() {
        let store = Arc::new(AuditStore::new(setup_audit_db().await));

        let first = AuditBuilder::new(store.clone(), "custom")
            .add_sensitive("email", "a@example.ac.ke")
            .build();
        let second = AuditBuilder::new(store, "custom")
            .add_sensitive("email", "a@example.ac.ke")
            .build();

        let hashed = first.data["email"].as_str().unwrap();
        assert!(hashed.starts_with("sha256:"));
        assert!(!hashed.contains("a@example.ac.ke"));
        assert_eq!(first.data["email"], second.data["email"]);
    }

    #[tokio::test]
    async fn test_write_persists_event() {
        let store = Arc::new(AuditStore::new(setup_audit_db().await));

        AuditBuilder::new(store.clone(), "timetable_exported")
            .actor_id("admin-1")
            .write()
            .await
            .unwrap();

        let events = store.events_of_type("timetable_exported").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor_id, "admin-1");
    }
}
