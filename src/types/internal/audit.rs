use std::collections::HashMap;
use std::fmt;

/// Event types for audit logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    EnrollmentCreated,
    EnrollmentRejected,
    AccessDenied,
    AccessRedirected,
    UserCreated,
    RolesAssigned,
    TokenIssued,
    CliSessionStart,
    CliSessionEnd,
    Custom(String),
}

impl EventType {
    /// Convert EventType to string representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::EnrollmentCreated => "enrollment_created",
            Self::EnrollmentRejected => "enrollment_rejected",
            Self::AccessDenied => "access_denied",
            Self::AccessRedirected => "access_redirected",
            Self::UserCreated => "user_created",
            Self::RolesAssigned => "roles_assigned",
            Self::TokenIssued => "token_issued",
            Self::CliSessionStart => "cli_session_start",
            Self::CliSessionEnd => "cli_session_end",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        EventType::Custom(s.to_string())
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        EventType::Custom(s)
    }
}

/// Audit event structure for building and storing audit logs
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: EventType,
    pub actor_id: String,
    pub request_id: Option<String>,
    pub source: String,
    pub ip_address: Option<String>,
    pub school: Option<String>,
    pub data: HashMap<String, serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event with the specified event type
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            actor_id: "unknown".to_string(),
            request_id: None,
            source: "System".to_string(),
            ip_address: None,
            school: None,
            data: HashMap::new(),
        }
    }
}
