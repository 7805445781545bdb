// Request and response bodies exposed through the OpenAPI surface
pub mod access;
pub mod common;
pub mod enrollment;
pub mod school;
