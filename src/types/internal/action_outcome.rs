use super::audit_intent::AuditIntent;

/// Value produced by a provider together with the audit events it implies
pub struct ActionOutcome<T> {
    pub value: T,
    pub audit: Vec<AuditIntent>,
}

impl<T> ActionOutcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            audit: Vec::new(),
        }
    }

    pub fn with_audit(mut self, intent: AuditIntent) -> Self {
        self.audit.push(intent);
        self
    }
}
