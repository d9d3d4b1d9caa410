//! Server test utilities.

use std::sync::Arc;
use vpcalloc_core::AddressBlock;
use vpcalloc_core::config::{AppConfig, IpamConfig, ServerConfig};
use vpcalloc_ipam::{IpamAuthority, MemoryIpam};
use vpcalloc_server::{AppState, create_router};

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    /// The in-memory authority, when the server was built with one.
    pub ipam: Option<Arc<MemoryIpam>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server backed by an in-memory authority holding
    /// `prefixes`. Response delivery is off.
    pub fn new(prefixes: &[&str]) -> Self {
        Self::build(prefixes, false)
    }

    /// Like [`TestServer::new`], but PUTs lifecycle responses.
    pub fn with_delivery(prefixes: &[&str]) -> Self {
        Self::build(prefixes, true)
    }

    fn build(prefixes: &[&str], deliver_responses: bool) -> Self {
        let prefixes: Vec<AddressBlock> = prefixes
            .iter()
            .map(|p| AddressBlock::parse(p).expect("valid test prefix"))
            .collect();
        let ipam = Arc::new(MemoryIpam::new(prefixes.iter().copied()));

        let config = AppConfig {
            server: ServerConfig {
                deliver_responses,
                ..Default::default()
            },
            ipam: IpamConfig::Memory { prefixes },
        };

        let mut server = Self::with_authority(config, ipam.clone());
        server.ipam = Some(ipam);
        server
    }

    /// Create a test server around an arbitrary authority.
    pub fn with_authority(config: AppConfig, authority: Arc<dyn IpamAuthority>) -> Self {
        let state = AppState::new(config, authority).expect("Failed to create app state");
        let router = create_router(state.clone());

        Self {
            router,
            state,
            ipam: None,
        }
    }
}
