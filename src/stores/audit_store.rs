use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::types::db::audit_event;
use crate::types::internal::audit::AuditEvent;

/// Repository for the audit database
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Write an audit event
    ///
    /// The data map is stored as a JSON object in the `data` column.
    pub async fn write_event(&self, event: AuditEvent) -> Result<(), InternalError> {
        let data_json = serde_json::to_string(&event.data).map_err(|e| {
            AuditError::LogWriteFailed(format!("Failed to serialize audit data: {}", e))
        })?;

        audit_event::ActiveModel {
            occurred_at: Set(Utc::now().to_rfc3339()),
            event_type: Set(event.event_type.to_string()),
            actor_id: Set(event.actor_id),
            request_id: Set(event.request_id),
            source: Set(event.source),
            ip_address: Set(event.ip_address),
            school: Set(event.school),
            data: Set(data_json),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| InternalError::database("write_audit_event", e))?;

        Ok(())
    }

    /// Events of one type, oldest first
    pub async fn events_of_type(&self, event_type: &str) -> Result<Vec<audit_event::Model>, InternalError> {
        audit_event::Entity::find()
            .filter(audit_event::Column::EventType.eq(event_type))
            .order_by_asc(audit_event::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("events_of_type", e))
    }
}
