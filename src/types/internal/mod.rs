pub mod access;
pub mod action_outcome;
pub mod audit;
pub mod audit_intent;
pub mod auth;
pub mod context;
pub mod enrollment;
pub mod group_policy;
pub mod principal;
pub mod school;

pub use access::{AccessDecision, DenyReason, GuardMode};
pub use auth::Claims;
pub use principal::{Capabilities, Principal};
pub use school::{HomeSchool, SchoolCode};
