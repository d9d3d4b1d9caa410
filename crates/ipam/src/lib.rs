//! IPAM authority abstraction, backends and the VPC block allocator.
//!
//! This crate provides:
//! - The `IpamAuthority` trait: find a registered block, reserve a child block
//! - Backends: NetBox (REST) and in-memory
//! - `allocate`: reserve a VPC block and pack its subnets

pub mod allocator;
pub mod backends;
pub mod error;
pub mod traits;

pub use allocator::{allocate, allocate_properties};
pub use backends::{memory::MemoryIpam, netbox::NetBoxIpam};
pub use error::{AllocationError, IpamError, IpamResult};
pub use traits::{BlockHandle, IpamAuthority, RegisteredBlock};

use std::sync::Arc;
use vpcalloc_core::config::IpamConfig;

/// Create an IPAM authority from configuration.
///
/// Resolves the NetBox token once, here.
pub fn from_config(config: &IpamConfig) -> IpamResult<Arc<dyn IpamAuthority>> {
    config.validate().map_err(IpamError::Config)?;

    match config {
        IpamConfig::Netbox { url, token, .. } => {
            let token = token
                .resolve()
                .map_err(|e| IpamError::Config(e.to_string()))?;
            let backend = NetBoxIpam::new(url, &token, config.timeout())?;
            Ok(Arc::new(backend))
        }
        IpamConfig::Memory { prefixes } => {
            tracing::warn!("Using in-memory IPAM authority; reservations are not persisted");
            Ok(Arc::new(MemoryIpam::new(prefixes.iter().copied())))
        }
    }
}
