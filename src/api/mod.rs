// API layer - HTTP endpoints
pub mod access;
pub mod enrollment;
pub mod health;
pub mod schools;

pub use access::AccessApi;
pub use enrollment::EnrollmentApi;
pub use health::HealthApi;
pub use schools::SchoolsApi;

use poem_openapi::{SecurityScheme, auth::Bearer};

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(Bearer);
