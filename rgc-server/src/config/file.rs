//! TOML file configuration structures.
//!
//! These structs directly map to the `rgc-config.toml` file format.

use rgc_core::pricing::dgu::DguRateOverride;
use serde::Deserialize;
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub signing: SigningSection,
    pub platform: PlatformSection,
    /// Optional replacement for the built-in DGU rate table.
    #[serde(default)]
    pub pricing: Option<DguRateOverride>,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

pub(super) fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Request signing section.
#[derive(Debug, Clone, Deserialize)]
pub struct SigningSection {
    /// Shared secret for HMAC verification of storefront submissions.
    pub secret: String,
    /// Maximum allowed clock skew in milliseconds.
    #[serde(default = "default_max_skew_ms")]
    pub max_skew_ms: i64,
    /// Allowed CORS origins. Empty reflects any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_max_skew_ms() -> i64 {
    rgc_sdk::signature::DEFAULT_MAX_SKEW_MS
}

/// Order platform section.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSection {
    /// GraphQL admin API endpoint.
    pub api_url: Url,
    pub access_token: String,
    /// Anchor product variant for DGU line items.
    pub dgu_anchor_variant: String,
    /// Anchor product variant for skylight line items.
    pub skylight_anchor_variant: String,
    #[serde(default = "default_poll_attempts")]
    pub invoice_poll_attempts: u32,
    #[serde(default = "default_poll_delay_ms")]
    pub invoice_poll_delay_ms: u64,
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_delay_ms() -> u64 {
    250
}
