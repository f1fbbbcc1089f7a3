//! Tracing and logging setup
//!
//! One subscriber per process, chosen by deployment environment. `RUST_LOG`
//! replaces the computed filter entirely when set.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::Environment;

/// HTTP plumbing that logs every request at debug level
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the bot's own crates
    pub level: Level,
    /// Emit one JSON object per event
    pub json: bool,
    /// Log span open/close (shows how long each command held its guild)
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
    /// Keep HTTP client and server internals at `warn`
    pub quiet_http: bool,
}

impl TracingConfig {
    /// Pick a configuration for the deployment environment
    ///
    /// Development is verbose and human-readable; production is JSON at
    /// `info`; staging sits in between.
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                json: false,
                span_events: true,
                file_line: true,
                quiet_http: true,
            },
            Environment::Staging => Self {
                level: Level::INFO,
                json: false,
                span_events: false,
                file_line: true,
                quiet_http: true,
            },
            Environment::Production => Self {
                level: Level::INFO,
                json: true,
                span_events: false,
                file_line: false,
                quiet_http: true,
            },
        }
    }

    /// Filter directives used when `RUST_LOG` is not set
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.to_string().to_lowercase()];
        if self.quiet_http {
            directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
        }
        directives.join(",")
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn layers(&self) -> (EnvFilter, Box<dyn Layer<Registry> + Send + Sync>) {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()));

        let fmt_layer = fmt::layer()
            .with_file(self.file_line)
            .with_line_number(self.file_line)
            .with_target(true)
            .with_span_events(self.span_events());

        let fmt_layer = if self.json {
            fmt_layer.json().boxed()
        } else {
            fmt_layer.boxed()
        };

        (env_filter, fmt_layer)
    }
}

/// Install the global subscriber
///
/// Fails instead of panicking when a subscriber is already installed.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let (env_filter, fmt_layer) = config.layers();
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
