//! Configuration module for rgc-server.
//!
//! Handles loading configuration from the TOML file and CLI arguments, and
//! building the immutable runtime configuration the pipeline runs with.

pub mod file;

use crate::config::file::FileConfig;
use rgc_core::config::{PlatformConfig, RuntimeConfig, SigningConfig};
use rgc_core::gateway::RetryPolicy;
use rgc_core::pricing::dgu::{DguRateTable, RateTableError};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid pricing override: {0}")]
    RateTable(#[from] RateTableError),
}

/// Loaded configuration result.
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub runtime: RuntimeConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the immutable runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        build_loaded_config(file_config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.signing.secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "signing.secret must not be empty".to_owned(),
        ));
    }
    if config.signing.max_skew_ms <= 0 {
        return Err(ConfigError::ValidationError(
            "signing.max_skew_ms must be positive".to_owned(),
        ));
    }
    if config.platform.access_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "platform.access_token must not be empty".to_owned(),
        ));
    }
    for (name, value) in [
        ("platform.dgu_anchor_variant", &config.platform.dgu_anchor_variant),
        (
            "platform.skylight_anchor_variant",
            &config.platform.skylight_anchor_variant,
        ),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{name} must not be empty"
            )));
        }
    }
    if config.platform.invoice_poll_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "platform.invoice_poll_attempts must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let dgu_rates = match &file_config.pricing {
        Some(spec) => DguRateTable::from_override(spec)?,
        None => DguRateTable::standard(),
    };

    Ok(LoadedConfig {
        listen: file_config.server.listen,
        runtime: RuntimeConfig {
            signing: SigningConfig::new(
                file_config.signing.secret.into_bytes().into_boxed_slice(),
                file_config.signing.max_skew_ms,
                file_config.signing.allowed_origins,
            ),
            platform: PlatformConfig {
                api_url: file_config.platform.api_url,
                access_token: file_config.platform.access_token,
                dgu_anchor_variant: file_config.platform.dgu_anchor_variant,
                skylight_anchor_variant: file_config.platform.skylight_anchor_variant,
                invoice_retry: RetryPolicy {
                    attempts: file_config.platform.invoice_poll_attempts,
                    delay: Duration::from_millis(file_config.platform.invoice_poll_delay_ms),
                },
            },
            dgu_rates,
        },
    })
}
