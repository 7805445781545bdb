use crate::errors::InternalError;
use crate::types::internal::action_outcome::ActionOutcome;

// Types layer - All data structures
pub mod db;
pub mod dto;
pub mod internal;

pub type ProviderResult<T> = Result<ActionOutcome<T>, InternalError>;
