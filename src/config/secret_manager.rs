use std::fmt;
use std::sync::Arc;

use crate::config::config_spec::ConfigSpec;
use crate::config::env_provider::{SharedEnvironment, SystemEnvironment};
use crate::config::errors::ApplicationError;

/// Holds the secrets loaded at startup
pub struct SecretManager {
    jwt_secret: String,
}

impl SecretManager {
    pub const JWT_SECRET_MIN_LENGTH: usize = 32;

    /// Load and validate all secrets
    ///
    /// # Errors
    /// `MissingSetting` when `JWT_SECRET` is unset, `InvalidSetting` when it
    /// is shorter than 32 characters.
    pub fn from_env_provider(env_provider: SharedEnvironment) -> Result<Self, ApplicationError> {
        let jwt_secret = ConfigSpec::new(env_provider)
            .env_override("JWT_SECRET")
            .required(true)
            .min_length(Self::JWT_SECRET_MIN_LENGTH)
            .load()?;

        Ok(Self { jwt_secret })
    }

    pub fn init() -> Result<Self, ApplicationError> {
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}
