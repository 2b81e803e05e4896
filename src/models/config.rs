//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_static_dir() -> String {
    "./dist".to_string()
}

fn default_token_ttl_secs() -> u64 {
    8 * 3600
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HMAC secret used to sign and verify bearer tokens.
    pub secret: String,
    /// Built single-page application served at `/` when present.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Lifetime of tokens minted by `issue-token`.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

/// Loads `config/default.yaml`, the `APP_ENV` profile and `APP_*` overrides.
#[cfg(feature = "server")]
pub fn load_server_config() -> Result<ServerConfig, config::ConfigError> {
    // Select config profile (defaults to `local`).
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    config::Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ServerConfig>()
}
