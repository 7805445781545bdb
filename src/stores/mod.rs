// Stores layer - Data access and repository pattern
pub mod audit_store;
pub mod catalog_store;
pub mod enrollment_store;
pub mod user_store;

pub use audit_store::AuditStore;
pub use catalog_store::CatalogStore;
pub use enrollment_store::EnrollmentStore;
pub use user_store::{NewUser, UserStore};
