use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::db::user;
use crate::types::internal::auth::Claims;
use crate::types::internal::principal::Principal;

/// Issues and validates HS256 access tokens
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    jwt_expiration_minutes: i64,
}

impl TokenProvider {
    pub const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self {
            secret_manager,
            jwt_expiration_minutes: Self::DEFAULT_EXPIRATION_MINUTES,
        }
    }

    pub fn with_expiration_minutes(mut self, minutes: i64) -> Self {
        self.jwt_expiration_minutes = minutes;
        self
    }

    /// Generate a JWT carrying the user's roles and persisted home school
    ///
    /// # Returns
    /// Tuple of (encoded JWT, JWT ID)
    pub fn generate_jwt(&self, user: &user::Model) -> Result<(String, String), InternalError> {
        let principal = Principal::from_user(user);
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: principal.user_id,
            code: principal.code,
            roles: principal.roles,
            home_school: principal.home_school.map(|h| h.as_str().to_string()),
            exp: now + self.jwt_expiration_minutes * 60,
            iat: now,
            jti: jti.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", format!("Failed to generate JWT: {}", e)))?;

        Ok((token, jti))
    }

    /// Validate a JWT and return its claims
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                InternalError::from(CredentialError::ExpiredToken("jwt".to_string()))
            }
            ErrorKind::InvalidSignature => {
                tracing::warn!("JWT with invalid signature presented");
                InternalError::from(CredentialError::invalid_token("jwt", "invalid signature"))
            }
            _ => InternalError::from(CredentialError::invalid_token("jwt", "malformed")),
        })
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .finish()
    }
}
