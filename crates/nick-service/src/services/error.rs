//! Service layer error types
//!
//! Only structural failures are errors here. A member that could not be
//! renamed is a [`RestoreOutcome`](crate::dto::RestoreOutcome), not an error.

use nick_common::error::domain_status;
use nick_common::AppError;
use nick_core::{DomainError, PlatformError};

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Structural failure of a capture, restore, or audit
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The engine was wired without one of its ports
    #[error("Service context is missing its {0}")]
    MissingDependency(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The wrapped domain error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => domain_status(e),
            Self::MissingDependency(_) | Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::MissingDependency(_) => "MISSING_DEPENDENCY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<PlatformError> for ServiceError {
    fn from(err: PlatformError) -> Self {
        Self::Domain(DomainError::Platform(err))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            other => AppError::internal(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
