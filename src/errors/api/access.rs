use crate::errors::internal::{AccessError, CredentialError, InternalError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Access check endpoint error types
///
/// Guard outcomes (allow, redirect, deny) are regular responses; only a
/// missing principal or an infrastructure failure ends up here.
#[derive(ApiResponse, Debug)]
pub enum AccessApiError {
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AccessApiError {
    pub fn unauthenticated() -> Self {
        AccessApiError::Unauthorized(Json(ErrorResponse {
            error: "unauthenticated".to_string(),
            message: "Authentication required".to_string(),
            status_code: 401,
        }))
    }

    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Access(AccessError::Unauthenticated) => Self::unauthenticated(),
            InternalError::Credential(CredentialError::InvalidToken { .. })
            | InternalError::Credential(CredentialError::ExpiredToken(_)) => {
                tracing::debug!("Rejected token on access check: {}", err);
                Self::unauthenticated()
            }
            _ => {
                tracing::error!("Unexpected error in access check: {}", err);
                AccessApiError::InternalError(Json(ErrorResponse {
                    error: "internal_error".to_string(),
                    message: "An internal error occurred".to_string(),
                    status_code: 500,
                }))
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            AccessApiError::Unauthorized(json) => json.0.message.clone(),
            AccessApiError::InternalError(json) => json.0.message.clone(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AccessApiError::Unauthorized(json) => json.0.status_code,
            AccessApiError::InternalError(json) => json.0.status_code,
        }
    }
}

impl fmt::Display for AccessApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
