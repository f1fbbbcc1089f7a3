//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AuditConfig, BotConfig, ConfigError, Environment, PlatformConfig,
    ServerConfig, StorageConfig, GUILD_PLACEHOLDER,
};
