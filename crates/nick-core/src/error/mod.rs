//! Domain and platform error types

mod domain_error;
mod platform_error;

pub use domain_error::DomainError;
pub use platform_error::PlatformError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
