//! Sequential subnet packing inside a reserved VPC block.
//!
//! Subnets are carved from the start of the VPC block in request order. Each
//! one starts at the first address at or after the end of the previous one
//! that is aligned for its own size, so blocks never overlap and no pairwise
//! check is needed.

use crate::block::{AddressBlock, block_size};
use crate::request::BlockSpec;
use std::net::Ipv4Addr;

/// Packing cursor over a VPC block.
#[derive(Clone, Debug)]
pub struct Cursor {
    vpc: AddressBlock,
    /// Next free address. Kept as u64 so stepping past 255.255.255.255 does
    /// not wrap.
    next: u64,
}

impl Cursor {
    pub fn new(vpc: AddressBlock) -> Self {
        Self {
            vpc,
            next: vpc.start(),
        }
    }

    /// Address the next subnet search starts from, if still inside the space.
    pub fn position(&self) -> Option<Ipv4Addr> {
        u32::try_from(self.next).ok().map(Ipv4Addr::from)
    }

    /// Carve the next subnet for `spec` and advance past it.
    pub fn take(&mut self, spec: &BlockSpec) -> crate::Result<AddressBlock> {
        let size = block_size(spec.prefix_len);
        let base = self.next.div_ceil(size) * size;
        let last = base + size - 1;

        if last > self.vpc.end() {
            return Err(crate::Error::InsufficientSpace {
                subnet: spec.name.clone(),
                prefix_len: spec.prefix_len,
                boundary: self.vpc.last_address(),
            });
        }

        // `last` is within the VPC, so `base` fits in 32 bits.
        let base = u32::try_from(base)
            .map_err(|_| crate::Error::InvalidBlock(format!("address {base} out of range")))?;
        let block = AddressBlock::new(Ipv4Addr::from(base), spec.prefix_len)?;
        self.next = last + 1;
        Ok(block)
    }
}

/// Pack `subnets` into `vpc`, returning one block per spec in the same order.
pub fn subdivide(vpc: &AddressBlock, subnets: &[BlockSpec]) -> crate::Result<Vec<AddressBlock>> {
    let mut cursor = Cursor::new(*vpc);
    subnets
        .iter()
        .map(|spec| {
            let block = cursor.take(spec)?;
            tracing::debug!(subnet = %spec.name, block = %block, "Subnet carved");
            Ok(block)
        })
        .collect()
}
