use std::collections::HashMap;
use crate::types::internal::audit::EventType;

/// An audit event a provider wants recorded once its unit of work commits
#[derive(Debug, Clone)]
pub struct AuditIntent {
    pub event_type: EventType,
    pub data: HashMap<String, serde_json::Value>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AuditIntent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            data: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
