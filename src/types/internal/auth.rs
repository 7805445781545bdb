use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    pub sub: String,

    /// University code of the user (student or staff number)
    pub code: String,

    /// Role names assigned to the user when the token was issued
    pub roles: Vec<String>,

    /// Home school persisted at role-assignment time
    pub home_school: Option<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID
    pub jti: String,
}
