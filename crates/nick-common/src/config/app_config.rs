//! Application configuration structs
//!
//! Loads configuration from environment variables (and an optional `.env`).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Placeholder replaced by the guild id in the snapshot path template
pub const GUILD_PLACEHOLDER: &str = "{}";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub bot: BotConfig,
    pub platform: PlatformConfig,
    pub storage: StorageConfig,
    pub audit: AuditConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Control surface listener
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bot credential
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig").field("token", &"<redacted>").finish()
    }
}

/// Platform REST client settings
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_member_page_size")]
    pub member_page_size: u16,
}

impl PlatformConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Snapshot storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path template for active snapshots; `{}` is replaced by the guild id
    #[serde(default = "default_state_path_template")]
    pub state_path_template: String,
}

impl StorageConfig {
    /// Active snapshot path for a guild
    #[must_use]
    pub fn state_path(&self, guild_id: &str) -> String {
        self.state_path_template.replacen(GUILD_PLACEHOLDER, guild_id, 1)
    }
}

/// Startup permission audit settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_on_startup")]
    pub on_startup: bool,
}

// Default value functions
fn default_app_name() -> String {
    "nick-bot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5012
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_member_page_size() -> u16 {
    1000
}

fn default_state_path_template() -> String {
    "./state_{}.temp.json".to_string()
}

fn default_audit_on_startup() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `AUTH` is missing or a value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key, raw))
                })
                .transpose()
        };

        let port = match parsed("PORT")? {
            Some(port) => {
                u16::try_from(port).map_err(|_| ConfigError::InvalidValue("PORT", port.to_string()))?
            }
            None => default_port(),
        };

        let member_page_size = match parsed("MEMBER_PAGE_SIZE")? {
            Some(size @ 1..=1000) => size as u16,
            Some(size) => return Err(ConfigError::InvalidValue("MEMBER_PAGE_SIZE", size.to_string())),
            None => default_member_page_size(),
        };

        let state_path_template =
            lookup("STATE_PATH_TEMPLATE").unwrap_or_else(default_state_path_template);
        if !state_path_template.contains(GUILD_PLACEHOLDER) {
            return Err(ConfigError::InvalidValue(
                "STATE_PATH_TEMPLATE",
                state_path_template,
            ));
        }

        let on_startup = match lookup("AUDIT_ON_STARTUP") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidValue("AUDIT_ON_STARTUP", raw)),
            },
            None => default_audit_on_startup(),
        };

        let token = lookup("AUTH")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingVar("AUTH"))?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: lookup("HOST").unwrap_or_else(default_host),
                port,
            },
            bot: BotConfig { token },
            platform: PlatformConfig {
                api_base: lookup("PLATFORM_API_BASE")
                    .map(|base| base.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base),
                request_timeout_secs: parsed("PLATFORM_REQUEST_TIMEOUT_SECS")?
                    .unwrap_or_else(default_request_timeout),
                member_page_size,
            },
            storage: StorageConfig {
                state_path_template,
            },
            audit: AuditConfig { on_startup },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
