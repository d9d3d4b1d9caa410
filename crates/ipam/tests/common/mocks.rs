use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use vpcalloc_core::AddressBlock;
use vpcalloc_ipam::{BlockHandle, IpamAuthority, IpamError, IpamResult, RegisteredBlock};

/// Authority that answers from a fixed script and counts every call.
#[allow(dead_code)]
pub struct ScriptedIpam {
    pub parent: Option<AddressBlock>,
    pub reserved: AddressBlock,
    pub find_calls: AtomicUsize,
    pub reserve_calls: AtomicUsize,
    pub requested_lengths: Mutex<Vec<u8>>,
}

#[allow(dead_code)]
impl ScriptedIpam {
    pub fn new(parent: Option<AddressBlock>, reserved: AddressBlock) -> Self {
        Self {
            parent,
            reserved,
            find_calls: AtomicUsize::new(0),
            reserve_calls: AtomicUsize::new(0),
            requested_lengths: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst) + self.reserve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpamAuthority for ScriptedIpam {
    async fn find_block(&self, block: &AddressBlock) -> IpamResult<Option<RegisteredBlock>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.parent.filter(|p| p == block).map(|p| RegisteredBlock {
            handle: BlockHandle::new("1"),
            block: p,
        }))
    }

    async fn reserve_child_block(
        &self,
        _parent: &RegisteredBlock,
        prefix_len: u8,
    ) -> IpamResult<RegisteredBlock> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_lengths.lock().unwrap().push(prefix_len);
        Ok(RegisteredBlock {
            handle: BlockHandle::new("2"),
            block: self.reserved,
        })
    }
}

/// Authority whose every call is rejected.
#[allow(dead_code)]
pub struct FailingIpam;

#[async_trait]
impl IpamAuthority for FailingIpam {
    async fn find_block(&self, _block: &AddressBlock) -> IpamResult<Option<RegisteredBlock>> {
        Err(IpamError::Rejected {
            status: 403,
            body: r#"{"detail":"Invalid token"}"#.to_string(),
        })
    }

    async fn reserve_child_block(
        &self,
        _parent: &RegisteredBlock,
        _prefix_len: u8,
    ) -> IpamResult<RegisteredBlock> {
        Err(IpamError::Rejected {
            status: 403,
            body: r#"{"detail":"Invalid token"}"#.to_string(),
        })
    }
}
