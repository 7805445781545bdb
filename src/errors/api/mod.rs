// API-facing error types
pub mod access;
pub mod enrollment;

// Re-exports for convenience
pub use access::AccessApiError;
pub use enrollment::EnrollmentApiError;
