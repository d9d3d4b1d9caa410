//! In-process IPAM authority.
//!
//! Keeps every registered block in a single list, the way NetBox keeps
//! prefixes: a reserved child becomes a registered block itself and occupies
//! space under its parent. Nothing is persisted.

use crate::error::{IpamError, IpamResult};
use crate::traits::{BlockHandle, IpamAuthority, RegisteredBlock};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;
use vpcalloc_core::AddressBlock;
use vpcalloc_core::block::block_size;

/// In-memory IPAM authority.
#[derive(Debug, Default)]
pub struct MemoryIpam {
    blocks: Mutex<Vec<AddressBlock>>,
}

impl MemoryIpam {
    /// Create an authority with `prefixes` registered.
    pub fn new(prefixes: impl IntoIterator<Item = AddressBlock>) -> Self {
        let ipam = Self::default();
        for prefix in prefixes {
            ipam.register(prefix);
        }
        ipam
    }

    /// Register a block. Registering the same block twice is a no-op.
    pub fn register(&self, block: AddressBlock) -> RegisteredBlock {
        let mut blocks = self.lock();
        if !blocks.contains(&block) {
            blocks.push(block);
            blocks.sort();
        }
        registered(block)
    }

    /// Snapshot of all registered blocks, sorted.
    pub fn blocks(&self) -> Vec<AddressBlock> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AddressBlock>> {
        // The list is always left consistent, so a poisoned lock is still usable.
        self.blocks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn registered(block: AddressBlock) -> RegisteredBlock {
    RegisteredBlock {
        handle: BlockHandle::new(block.to_string()),
        block,
    }
}

/// Lowest-addressed block of `prefix_len` inside `parent` that overlaps none
/// of `taken`.
fn first_free(parent: &AddressBlock, prefix_len: u8, taken: &[AddressBlock]) -> Option<u64> {
    if prefix_len < parent.prefix_len() {
        return None;
    }
    let size = block_size(prefix_len);
    let mut start = parent.start();
    loop {
        let end = start + size - 1;
        if end > parent.end() {
            return None;
        }
        match taken
            .iter()
            .filter(|b| b.start() <= end && start <= b.end())
            .map(AddressBlock::end)
            .max()
        {
            // Skip past the blocking allocation and realign.
            Some(blocked_until) => start = (blocked_until + 1).div_ceil(size) * size,
            None => return Some(start),
        }
    }
}

#[async_trait]
impl IpamAuthority for MemoryIpam {
    #[instrument(skip(self), fields(backend = "memory"))]
    async fn find_block(&self, block: &AddressBlock) -> IpamResult<Option<RegisteredBlock>> {
        Ok(self.lock().contains(block).then(|| registered(*block)))
    }

    #[instrument(skip(self, parent), fields(backend = "memory", parent = %parent.block))]
    async fn reserve_child_block(
        &self,
        parent: &RegisteredBlock,
        prefix_len: u8,
    ) -> IpamResult<RegisteredBlock> {
        // One lock for find-and-insert keeps concurrent reservations disjoint.
        let mut blocks = self.lock();
        if !blocks.contains(&parent.block) {
            return Err(IpamError::UnknownParent(parent.block));
        }

        let children: Vec<AddressBlock> = blocks
            .iter()
            .filter(|b| **b != parent.block && parent.block.contains(b))
            .copied()
            .collect();

        let start = first_free(&parent.block, prefix_len, &children).ok_or(
            IpamError::Exhausted {
                parent: parent.block,
                prefix_len,
            },
        )?;
        let base = u32::try_from(start)
            .map_err(|_| IpamError::InvalidResponse(format!("address {start} out of range")))?;
        let block = AddressBlock::new(base.into(), prefix_len)
            .map_err(|e| IpamError::InvalidResponse(e.to_string()))?;

        blocks.push(block);
        blocks.sort();
        tracing::debug!(block = %block, "Block reserved");
        Ok(registered(block))
    }
}
