//! VPC block allocation.
//!
//! Reserve a VPC block from the authority, then pack the requested subnets
//! into it from the start. Only the reservation talks to the authority; the
//! packing is pure arithmetic.

use crate::error::{AllocationError, IpamError};
use crate::traits::IpamAuthority;
use serde_json::Value;
use vpcalloc_core::{AllocationRequest, AllocationResult, subdivide, validate};

/// Allocate the VPC block and its subnets for a validated request.
///
/// The result holds `"<VPCName>.CidrBlock"` first, then one entry per subnet
/// in request order.
#[tracing::instrument(skip(request, ipam), fields(parent = %request.parent, vpc = %request.vpc.name))]
pub async fn allocate(
    request: &AllocationRequest,
    ipam: &dyn IpamAuthority,
) -> Result<AllocationResult, AllocationError> {
    let parent = ipam
        .find_block(&request.parent)
        .await?
        .ok_or(AllocationError::ParentNotFound {
            parent: request.parent,
        })?;
    if parent.block != request.parent {
        return Err(IpamError::InvalidResponse(format!(
            "lookup for {} returned {}",
            request.parent, parent.block
        ))
        .into());
    }
    tracing::debug!(handle = %parent.handle, "Parent block found");

    let vpc = ipam
        .reserve_child_block(&parent, request.vpc.prefix_len)
        .await?;
    if vpc.block.prefix_len() != request.vpc.prefix_len || !parent.block.contains(&vpc.block) {
        return Err(IpamError::InvalidResponse(format!(
            "requested a /{} under {}, authority reserved {}",
            request.vpc.prefix_len, parent.block, vpc.block
        ))
        .into());
    }
    tracing::info!(block = %vpc.block, handle = %vpc.handle, "VPC block reserved");

    let mut result = AllocationResult::new();
    result.insert(&request.vpc.name, vpc.block);

    let subnets = subdivide(&vpc.block, &request.subnets).inspect_err(|e| {
        tracing::warn!(
            block = %vpc.block,
            error = %e,
            "Subnets do not fit; the VPC block stays reserved"
        );
    })?;
    for (spec, block) in request.subnets.iter().zip(subnets) {
        result.insert(&spec.name, block);
    }

    Ok(result)
}

/// Validate raw request properties, then allocate.
///
/// Validation failures return before the authority is contacted.
pub async fn allocate_properties(
    properties: &Value,
    ipam: &dyn IpamAuthority,
) -> Result<AllocationResult, AllocationError> {
    let request = validate(properties)?;
    allocate(&request, ipam).await
}
