// Coordinators layer - Workflow orchestration
//
// Coordinators sequence provider operations for one API endpoint or CLI
// command: authorization, transaction boundaries, retries and auditing.
// Domain rules stay in the providers.

pub mod access_coordinator;
pub mod admin_coordinator;
pub mod enrollment_coordinator;

pub use access_coordinator::AccessCoordinator;
pub use admin_coordinator::AdminCoordinator;
pub use enrollment_coordinator::EnrollmentCoordinator;
