use crate::config::ApplicationError;

/// Ordered group labels and per-group seat capacity for a unit in a semester.
///
/// Groups are filled strictly in label order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPolicy {
    labels: Vec<String>,
    capacity: u32,
}

impl GroupPolicy {
    pub const DEFAULT_LABELS: [&'static str; 4] = ["A", "B", "C", "D"];
    pub const DEFAULT_CAPACITY: u32 = 60;

    pub fn new(labels: Vec<String>, capacity: u32) -> Result<Self, ApplicationError> {
        if labels.is_empty() {
            return Err(ApplicationError::InvalidSetting {
                setting_name: "ENROLLMENT_GROUPS".to_string(),
                reason: "at least one group label is required".to_string(),
            });
        }
        if let Some(blank) = labels.iter().position(|label| label.trim().is_empty()) {
            return Err(ApplicationError::InvalidSetting {
                setting_name: "ENROLLMENT_GROUPS".to_string(),
                reason: format!("group label at position {} is blank", blank + 1),
            });
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(ApplicationError::InvalidSetting {
                    setting_name: "ENROLLMENT_GROUPS".to_string(),
                    reason: format!("group label '{}' is listed twice", label),
                });
            }
        }
        if capacity == 0 {
            return Err(ApplicationError::InvalidSetting {
                setting_name: "ENROLLMENT_GROUP_CAPACITY".to_string(),
                reason: "capacity must be greater than zero".to_string(),
            });
        }

        Ok(Self { labels, capacity })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn total_seats(&self) -> u64 {
        self.labels.len() as u64 * u64::from(self.capacity)
    }

    /// Same labels with a per-unit capacity override applied.
    /// Non-positive overrides are ignored.
    pub fn with_capacity_override(&self, capacity: Option<i32>) -> Self {
        match capacity.and_then(|c| u32::try_from(c).ok()).filter(|c| *c > 0) {
            Some(capacity) => Self {
                labels: self.labels.clone(),
                capacity,
            },
            None => self.clone(),
        }
    }
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            labels: Self::DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}
