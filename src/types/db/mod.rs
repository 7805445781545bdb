// Database entities - SeaORM models
pub mod audit_event;
pub mod enrollment;
pub mod semester;
pub mod unit;
pub mod user;
