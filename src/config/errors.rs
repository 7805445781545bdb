use std::fmt;

/// Configuration failures raised while loading settings at startup
#[derive(Debug)]
pub enum ApplicationError {
    DatabaseConnection(String),
    MissingSetting { setting_name: String },
    InvalidSetting { setting_name: String, reason: String },
    ParseError { setting_name: String, error: String },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseConnection(msg) => {
                write!(f, "Database connection error: {}", msg)
            }
            Self::MissingSetting { setting_name } => {
                write!(f, "Required setting '{}' is missing", setting_name)
            }
            Self::InvalidSetting { setting_name, reason } => {
                write!(f, "Invalid setting '{}': {}", setting_name, reason)
            }
            Self::ParseError { setting_name, error } => {
                write!(f, "Failed to parse setting '{}': {}", setting_name, error)
            }
        }
    }
}

impl std::error::Error for ApplicationError {}
