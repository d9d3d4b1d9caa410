//! IPAM authority trait definitions.

use crate::error::IpamResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use vpcalloc_core::AddressBlock;

/// Opaque authority-side identifier of a registered block.
///
/// For NetBox this is the prefix id; callers must not interpret it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHandle(String);

impl BlockHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHandle({})", self.0)
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A block known to the authority, either looked up or freshly reserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredBlock {
    pub handle: BlockHandle,
    pub block: AddressBlock,
}

/// External system of record for allocated address blocks.
///
/// Implementations must make `reserve_child_block` atomic with respect to
/// concurrent reservations: two callers never receive overlapping blocks.
#[async_trait]
pub trait IpamAuthority: Send + Sync + 'static {
    /// Find the registered block with exactly this base address and prefix
    /// length.
    async fn find_block(&self, block: &AddressBlock) -> IpamResult<Option<RegisteredBlock>>;

    /// Reserve the first free block of `prefix_len` inside `parent`.
    ///
    /// The returned block has exactly `prefix_len`, lies within `parent` and
    /// overlaps nothing the authority considers allocated.
    async fn reserve_child_block(
        &self,
        parent: &RegisteredBlock,
        prefix_len: u8,
    ) -> IpamResult<RegisteredBlock>;
}
