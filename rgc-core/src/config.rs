//! Validated runtime configuration.
//!
//! These types represent the configuration the server runs with. Loading and
//! parsing (TOML file + CLI overrides) is handled by the server crate; once
//! built, the configuration is immutable for the lifetime of the process and
//! passed explicitly into the pipeline so pricing and assembly stay pure.

use rgc_sdk::objects::CalculatorType;
use url::Url;

use crate::gateway::RetryPolicy;
use crate::pricing::dgu::DguRateTable;

/// Request signing configuration.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Shared secret bytes for HMAC verification.
    pub secret: Box<[u8]>,
    /// Maximum allowed clock skew, in milliseconds, in either direction.
    pub max_skew_ms: i64,
    /// Allowed CORS origins. Empty means any origin is reflected.
    pub allowed_origins: Vec<String>,
}

impl SigningConfig {
    pub fn new(secret: impl Into<Box<[u8]>>, max_skew_ms: i64, allowed_origins: Vec<String>) -> Self {
        Self {
            secret: secret.into(),
            max_skew_ms,
            allowed_origins,
        }
    }

    /// Secret key bytes for HMAC verification.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}

/// Order platform (draft order API) configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// GraphQL admin API endpoint.
    pub api_url: Url,
    /// Admin API access token.
    pub access_token: String,
    /// Anchor product variant for DGU line items.
    ///
    /// The platform only renders product imagery for line items tied to a
    /// known variant; the unit price is always overridden with the computed
    /// price, never taken from the variant's catalog price.
    pub dgu_anchor_variant: String,
    /// Anchor product variant for skylight line items.
    pub skylight_anchor_variant: String,
    /// Bounded retry policy for the invoice URL poll.
    pub invoice_retry: RetryPolicy,
}

impl PlatformConfig {
    /// The anchor variant id for a calculator type.
    pub fn anchor_variant(&self, calculator: CalculatorType) -> &str {
        match calculator {
            CalculatorType::Dgu => &self.dgu_anchor_variant,
            CalculatorType::Skylight => &self.skylight_anchor_variant,
        }
    }
}

/// Full runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub signing: SigningConfig,
    pub platform: PlatformConfig,
    /// DGU rate table (built-in standard table unless overridden in config).
    pub dgu_rates: DguRateTable,
}
