//! Application state
//!
//! Holds the engine context and the configuration the gate checks against.

use std::sync::Arc;

use nick_common::AppConfig;
use nick_service::ServiceContext;
use subtle::ConstantTimeEq;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether `token` is the credential callers must present
    ///
    /// Compared in constant time for equal-length inputs.
    pub fn accepts_credential(&self, token: &str) -> bool {
        self.config
            .bot
            .token
            .as_bytes()
            .ct_eq(token.as_bytes())
            .into()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &self.config)
            .finish()
    }
}
