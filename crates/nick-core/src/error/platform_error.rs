//! Platform client errors

use thiserror::Error;

/// Failure talking to the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("Platform unreachable: {0}")]
    Network(String),

    #[error("Rate limited by platform (retry after {retry_after_ms} ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("Platform rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected platform payload: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Create a rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "PLATFORM_UNREACHABLE",
            Self::RateLimited { .. } => "PLATFORM_RATE_LIMITED",
            Self::Rejected { .. } => "PLATFORM_REJECTED",
            Self::Decode(_) => "PLATFORM_DECODE_ERROR",
        }
    }

    /// Whether the platform could not answer right now
    ///
    /// A rejection or an unreadable payload is an answer; an outage or a rate
    /// limit is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }
}
