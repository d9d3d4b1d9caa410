//! Direct allocation endpoint.

use super::parse_json;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use vpcalloc_core::AllocationResult;
use vpcalloc_ipam::allocate_properties;

/// Allocation response.
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    /// `<Name>.CidrBlock` keys, VPC first, then subnets in request order.
    pub data: AllocationResult,
}

/// POST /v1/allocations - Reserve a VPC block and pack its subnets.
#[tracing::instrument(skip(state, body))]
pub async fn create_allocation(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AllocationResponse>> {
    let properties = parse_json(&body)?;
    let data = allocate_properties(&properties, state.ipam.as_ref()).await?;

    tracing::info!(blocks = data.len(), "Allocation completed");
    Ok(Json(AllocationResponse { data }))
}
