//! Core domain types and shared logic for vpcalloc.
//!
//! This crate defines the data model used across all other crates:
//! - IPv4 address blocks and their arithmetic
//! - Allocation requests and input validation
//! - Sequential subnet packing inside a reserved VPC block
//! - The ordered allocation result
//! - Configuration

pub mod block;
pub mod config;
pub mod error;
pub mod request;
pub mod result;
pub mod subdivide;

pub use block::{AddressBlock, MAX_PREFIX_LEN};
pub use error::{Error, Result, ValidationError};
pub use request::{AllocationRequest, BlockSpec, validate};
pub use result::{AllocationResult, CIDR_BLOCK_SUFFIX};
pub use subdivide::subdivide;
