//! Nickname bot entry point
//!
//! Loads configuration, starts tracing, audits permissions, and serves the
//! command surface.

use nick_common::{try_init_tracing_with_config, AppConfig, AppResult, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Configuration first: the tracing format depends on the environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        if e.is_startup_failure() {
            error!(error = %e, "Bot failed to start");
        } else {
            error!(error = %e, "Bot stopped with an error");
        }
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        env = ?config.app.env,
        port = config.api.port,
        "Starting nickname bot"
    );

    nick_api::run(config).await
}
