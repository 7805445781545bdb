use crate::errors::internal::{
    AccessError, CredentialError, EnrollmentError, InternalError, UserError,
};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

/// Enrollment endpoint error types
#[derive(ApiResponse, Debug)]
pub enum EnrollmentApiError {
    /// Request body failed validation
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// Missing, invalid or expired bearer token
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Caller is not allowed to act on this school or student
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Unit, semester or user does not exist
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Duplicate enrollment or no seats left
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Too many concurrent writers on the same unit
    #[oai(status = 503)]
    Busy(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

fn body(error: &str, message: impl Into<String>, status_code: u16) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code,
    })
}

impl EnrollmentApiError {
    pub fn unauthenticated() -> Self {
        EnrollmentApiError::Unauthorized(body("unauthenticated", "Authentication required", 401))
    }

    pub fn forbidden(error: &str, message: impl Into<String>) -> Self {
        EnrollmentApiError::Forbidden(body(error, message, 403))
    }

    pub fn bad_request(error: &str, message: impl Into<String>) -> Self {
        EnrollmentApiError::BadRequest(body(error, message, 400))
    }

    pub fn not_found(error: &str, message: impl Into<String>) -> Self {
        EnrollmentApiError::NotFound(body(error, message, 404))
    }

    pub fn conflict(error: &str, message: impl Into<String>) -> Self {
        EnrollmentApiError::Conflict(body(error, message, 409))
    }

    /// Convert InternalError to EnrollmentApiError
    ///
    /// Infrastructure details are logged and replaced with a generic message.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(_) => {
                tracing::error!("Database error in enrollment operation: {}", err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }

            InternalError::Enrollment(inner) => match inner {
                EnrollmentError::InvalidStudentCode => {
                    Self::bad_request("invalid_student_code", inner.to_string())
                }
                EnrollmentError::UnitNotFound { .. } => {
                    Self::not_found("unit_not_found", inner.to_string())
                }
                EnrollmentError::SemesterNotFound { .. } => {
                    Self::not_found("semester_not_found", inner.to_string())
                }
                EnrollmentError::DuplicateEnrollment { .. } => {
                    tracing::debug!("{}", inner);
                    Self::conflict("duplicate_enrollment", inner.to_string())
                }
                EnrollmentError::CapacityExhausted { .. } => {
                    tracing::info!("{}", inner);
                    Self::conflict("capacity_exhausted", inner.to_string())
                }
                EnrollmentError::SeatConflict { .. } | EnrollmentError::Contention { .. } => {
                    tracing::warn!("{}", inner);
                    EnrollmentApiError::Busy(body(
                        "enrollment_contention",
                        "The unit is receiving too many enrollments right now, please retry",
                        503,
                    ))
                }
            },

            InternalError::Access(inner) => match inner {
                AccessError::Unauthenticated => Self::unauthenticated(),
                AccessError::NoFacultyAssignment => Self::forbidden(
                    "no_faculty_assignment",
                    "Access denied: no faculty assignment. Please contact an administrator.",
                ),
                AccessError::CrossSchoolAccess { .. } => Self::forbidden(
                    "cross_school_access",
                    "Access denied: cross-school access is not permitted.",
                ),
                AccessError::NotPermitted { .. } => Self::forbidden("forbidden", inner.to_string()),
            },

            InternalError::User(UserError::UserNotFound { .. }) => {
                Self::not_found("user_not_found", "User not found")
            }

            InternalError::Credential(CredentialError::InvalidToken { reason, .. }) => {
                tracing::debug!("Invalid token: {}", reason);
                EnrollmentApiError::Unauthorized(body("invalid_token", "Invalid or malformed JWT", 401))
            }
            InternalError::Credential(CredentialError::ExpiredToken(_)) => {
                EnrollmentApiError::Unauthorized(body("expired_token", "JWT has expired", 401))
            }

            _ => {
                tracing::error!("Unexpected error in enrollment operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn internal_server_error() -> Self {
        EnrollmentApiError::InternalError(body("internal_error", "An internal error occurred", 500))
    }

    fn response(&self) -> &ErrorResponse {
        match self {
            EnrollmentApiError::BadRequest(json)
            | EnrollmentApiError::Unauthorized(json)
            | EnrollmentApiError::Forbidden(json)
            | EnrollmentApiError::NotFound(json)
            | EnrollmentApiError::Conflict(json)
            | EnrollmentApiError::Busy(json)
            | EnrollmentApiError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.response().message.clone()
    }

    pub fn error_code(&self) -> &str {
        &self.response().error
    }

    pub fn status_code(&self) -> u16 {
        self.response().status_code
    }
}

impl fmt::Display for EnrollmentApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
