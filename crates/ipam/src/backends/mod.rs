//! IPAM authority backends.

pub mod memory;
pub mod netbox;
