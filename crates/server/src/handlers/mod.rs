//! HTTP request handlers.

pub mod allocations;
pub mod events;
pub mod health;

pub use allocations::*;
pub use events::*;
pub use health::*;

use crate::error::{ApiError, ApiResult};
use axum::body::Bytes;
use serde_json::Value;

/// Parse a request body as JSON.
fn parse_json(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}
