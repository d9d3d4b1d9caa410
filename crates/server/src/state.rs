//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;
use vpcalloc_core::config::AppConfig;
use vpcalloc_ipam::IpamAuthority;

/// Timeout for PUTting lifecycle responses to their response URL.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// IPAM authority used for every allocation.
    pub ipam: Arc<dyn IpamAuthority>,
    /// HTTP client for lifecycle response delivery.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: AppConfig, ipam: Arc<dyn IpamAuthority>) -> Result<Self, reqwest::Error> {
        if !config.server.deliver_responses {
            tracing::warn!("Lifecycle response delivery is disabled");
        }

        let http = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            ipam,
            http,
        })
    }
}
