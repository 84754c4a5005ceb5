//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;
use url::Url;

use super::types::AppConfig;
use crate::common::errors::{ClientError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    // Add default config file if it exists
    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // Add environment variables with APP_ prefix
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    validate(&app_config)?;
    Ok(app_config)
}

/// Validate endpoint URLs and interval sanity before anything connects
fn validate(config: &AppConfig) -> Result<()> {
    for (name, raw) in [
        ("binance.websocket_url", &config.binance.websocket_url),
        ("binance.rest_url", &config.binance.rest_url),
        ("coinbase.websocket_url", &config.coinbase.websocket_url),
        ("coinbase.rest_url", &config.coinbase.rest_url),
    ] {
        Url::parse(raw)
            .map_err(|e| ClientError::Configuration(format!("{name}: {e} ({raw})")))?;
    }

    if config.settings.emit_throttle_ms == 0 {
        return Err(ClientError::Configuration(
            "settings.emit_throttle_ms must be positive".to_string(),
        ));
    }
    if config.fight.frame_duration_ms == 0 {
        return Err(ClientError::Configuration(
            "fight.frame_duration_ms must be positive".to_string(),
        ));
    }
    if config.fight.max_damage_points == 0 {
        return Err(ClientError::Configuration(
            "fight.max_damage_points must be positive".to_string(),
        ));
    }

    Ok(())
}
