use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User already exists: {code}")]
    DuplicateCode { code: String },

    #[error("User not found: {code}")]
    UserNotFound { code: String },
}
