//! Application state shared across all request handlers.

use rgc_core::config::RuntimeConfig;
use rgc_core::gateway::{DraftOrderGateway, OrderPlatform};
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// Cloneable and cheap to pass around (everything is behind Arc). The
/// configuration is immutable for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
    /// The order platform egress, behind the trait seam so tests can
    /// substitute a scripted double.
    pub platform: Arc<dyn OrderPlatform>,
}

impl AppState {
    /// Create the production state: a real gateway built from configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        let gateway = DraftOrderGateway::new(
            config.platform.api_url.clone(),
            config.platform.access_token.clone(),
        );
        Self {
            config: Arc::new(config),
            platform: Arc::new(gateway),
        }
    }

    /// Create a state with a custom platform implementation.
    pub fn with_platform(config: RuntimeConfig, platform: Arc<dyn OrderPlatform>) -> Self {
        Self {
            config: Arc::new(config),
            platform,
        }
    }
}
