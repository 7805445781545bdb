// Providers layer - Work performers and business logic
//
// Providers hold the domain rules and expose composable operations that
// coordinators sequence. Database work goes through stores on a connection
// or transaction chosen by the caller.

pub mod access_guard_provider;
pub mod enrollment_provider;
pub mod token_provider;

pub use access_guard_provider::AccessGuardProvider;
pub use enrollment_provider::EnrollmentProvider;
pub use token_provider::TokenProvider;
