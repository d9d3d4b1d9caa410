//! IPAM and allocation error types.

use std::net::Ipv4Addr;
use thiserror::Error;
use vpcalloc_core::{AddressBlock, ValidationError};

/// Errors raised while talking to an IPAM authority.
#[derive(Debug, Error)]
pub enum IpamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IPAM request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid IPAM response: {0}")]
    InvalidResponse(String),

    #[error("prefix {0} is registered more than once")]
    Ambiguous(AddressBlock),

    #[error("unknown parent block: {0}")]
    UnknownParent(AddressBlock),

    #[error("no free /{prefix_len} block available under {parent}")]
    Exhausted { parent: AddressBlock, prefix_len: u8 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for IPAM operations.
pub type IpamResult<T> = std::result::Result<T, IpamError>;

/// Why an allocation attempt failed.
///
/// Every kind is terminal for the attempt. A VPC block reserved before a
/// subnet failed to fit stays reserved.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("parent prefix {parent} is not defined in the IPAM authority")]
    ParentNotFound { parent: AddressBlock },

    #[error(
        "insufficient space for subnet {subnet} (/{prefix_len}): range would extend past {boundary}"
    )]
    InsufficientSpace {
        subnet: String,
        prefix_len: u8,
        boundary: Ipv4Addr,
    },

    #[error("IPAM authority error: {0}")]
    Authority(#[from] IpamError),
}

impl AllocationError {
    /// Stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::ParentNotFound { .. } => "parent_not_found",
            Self::InsufficientSpace { .. } => "insufficient_space",
            Self::Authority(_) => "authority_error",
        }
    }
}

impl From<vpcalloc_core::Error> for AllocationError {
    fn from(err: vpcalloc_core::Error) -> Self {
        match err {
            vpcalloc_core::Error::Validation(e) => Self::Validation(e),
            vpcalloc_core::Error::InsufficientSpace {
                subnet,
                prefix_len,
                boundary,
            } => Self::InsufficientSpace {
                subnet,
                prefix_len,
                boundary,
            },
            vpcalloc_core::Error::InvalidBlock(msg) => {
                Self::Authority(IpamError::InvalidResponse(msg))
            }
            vpcalloc_core::Error::Config(msg) => Self::Authority(IpamError::Config(msg)),
        }
    }
}
