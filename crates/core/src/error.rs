//! Error types for the core domain.

use std::net::Ipv4Addr;
use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address block: {0}")]
    InvalidBlock(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "insufficient space for subnet {subnet} (/{prefix_len}): range would extend past {boundary}"
    )]
    InsufficientSpace {
        subnet: String,
        prefix_len: u8,
        boundary: Ipv4Addr,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// A request property that is missing or has the wrong shape.
///
/// `field` is the property path as the caller wrote it, e.g. `VPC.BlockSize`
/// or `Subnets[2].Name`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("property {field} {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
