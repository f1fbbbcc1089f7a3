//! Application error types
//!
//! Errors of the bot process itself: loading configuration, wiring the
//! engine, and serving the command surface. Snapshot and restore failures
//! travel as [`DomainError`] and keep their own codes.

use nick_core::{DomainError, PlatformError};
use serde::Serialize;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform client setup failed: {0}")]
    PlatformSetup(#[from] PlatformError),

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

/// HTTP status for a domain error
///
/// A document the caller pointed us at is the caller's problem (422); a
/// local snapshot that no longer parses is ours (500).
pub fn domain_status(err: &DomainError) -> u16 {
    match err {
        DomainError::NoActiveSnapshot(_) | DomainError::NothingToCapture(_) => 404,
        DomainError::InvalidRemoteDocument(_) => 422,
        DomainError::RemoteFetchFailed(_) | DomainError::Platform(_) => 502,
        DomainError::CorruptSnapshot { .. } | DomainError::StoreIo { .. } => 500,
    }
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::PlatformSetup(_) => 502,
            Self::Domain(e) => domain_status(e),
            Self::Config(_) | Self::Bind { .. } | Self::Serve(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::PlatformSetup(_) => "PLATFORM_SETUP_FAILED",
            Self::Bind { .. } => "BIND_FAILED",
            Self::Serve(_) => "SERVER_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the process cannot start at all with this error
    #[must_use]
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::PlatformSetup(_) | Self::Bind { .. }
        )
    }

    /// Create a bind error for `addr`
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Error body shared by every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
