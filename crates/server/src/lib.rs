//! HTTP API server for the VPC block allocator.
//!
//! This crate provides:
//! - Direct allocation requests (`POST /v1/allocations`)
//! - Provisioning lifecycle events with response delivery (`POST /v1/events`)
//! - Health check

pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
