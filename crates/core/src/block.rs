//! IPv4 address block type and parsing.

use ipnet::Ipv4Net;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Longest valid IPv4 prefix length.
pub const MAX_PREFIX_LEN: u8 = 32;

/// A contiguous IPv4 range in CIDR form (`base/prefix_len`).
///
/// The base address is always the network address: host bits are zero.
/// Text such as `10.0.0.1/24` is rejected rather than truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressBlock(Ipv4Net);

impl AddressBlock {
    /// Create a block from its base address and prefix length.
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> crate::Result<Self> {
        let net = Ipv4Net::new(base, prefix_len).map_err(|_| {
            crate::Error::InvalidBlock(format!(
                "prefix length {prefix_len} exceeds {MAX_PREFIX_LEN}"
            ))
        })?;
        if net.trunc() != net {
            return Err(crate::Error::InvalidBlock(format!(
                "{net} has host bits set (network address is {})",
                net.trunc()
            )));
        }
        Ok(Self(net))
    }

    /// Parse `a.b.c.d/len`.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let net = Ipv4Net::from_str(s.trim())
            .map_err(|_| crate::Error::InvalidBlock(format!("not an IPv4 CIDR block: {s:?}")))?;
        Self::new(net.addr(), net.prefix_len())
    }

    /// The network (first) address.
    pub fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    /// The last address covered by the block.
    pub fn last_address(&self) -> Ipv4Addr {
        self.0.broadcast()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Number of addresses covered: 2^(32 - prefix_len).
    pub fn size(&self) -> u64 {
        block_size(self.prefix_len())
    }

    /// First address as an integer.
    pub fn start(&self) -> u64 {
        u64::from(u32::from(self.network()))
    }

    /// Last address as an integer (inclusive).
    pub fn end(&self) -> u64 {
        self.start() + self.size() - 1
    }

    /// Whether `other` lies entirely within this block.
    pub fn contains(&self, other: &AddressBlock) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Whether the two blocks share at least one address.
    pub fn overlaps(&self, other: &AddressBlock) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }
}

/// Number of addresses in a block of the given prefix length.
pub fn block_size(prefix_len: u8) -> u64 {
    1u64 << (u32::from(MAX_PREFIX_LEN) - u32::from(prefix_len.min(MAX_PREFIX_LEN)))
}

impl FromStr for AddressBlock {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressBlock({self})")
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len())
    }
}

impl Serialize for AddressBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlockVisitor;

        impl Visitor<'_> for BlockVisitor {
            type Value = AddressBlock;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an IPv4 CIDR block such as \"10.0.0.0/16\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<AddressBlock, E> {
                AddressBlock::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(BlockVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let block = AddressBlock::parse("172.16.0.0/12").unwrap();
        assert_eq!(block.network(), Ipv4Addr::new(172, 16, 0, 0));
        assert_eq!(block.prefix_len(), 12);
        assert_eq!(block.last_address(), Ipv4Addr::new(172, 31, 255, 255));
        assert_eq!(block.to_string(), "172.16.0.0/12");
    }

    #[test]
    fn test_parse_rejects_host_bits() {
        match AddressBlock::parse("10.0.0.1/24") {
            Err(crate::Error::InvalidBlock(msg)) => assert!(msg.contains("host bits")),
            other => panic!("expected InvalidBlock, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(AddressBlock::parse("10.0.0.0").is_err());
        assert!(AddressBlock::parse("10.0.0.0/33").is_err());
        assert!(AddressBlock::parse("300.0.0.0/8").is_err());
        assert!(AddressBlock::parse("fd00::/8").is_err());
        assert!(AddressBlock::parse("").is_err());
    }

    #[test]
    fn test_sizes_at_extremes() {
        let all = AddressBlock::parse("0.0.0.0/0").unwrap();
        assert_eq!(all.size(), 1u64 << 32);
        assert_eq!(all.end(), u64::from(u32::MAX));

        let host = AddressBlock::parse("255.255.255.255/32").unwrap();
        assert_eq!(host.size(), 1);
        assert_eq!(host.start(), host.end());
    }

    #[test]
    fn test_contains_and_overlaps() {
        let parent = AddressBlock::parse("10.0.0.0/16").unwrap();
        let child = AddressBlock::parse("10.0.16.0/20").unwrap();
        let outside = AddressBlock::parse("10.1.0.0/16").unwrap();

        assert!(parent.contains(&child));
        assert!(parent.contains(&parent));
        assert!(!child.contains(&parent));
        assert!(parent.overlaps(&child));
        assert!(!parent.overlaps(&outside));
        assert!(!parent.contains(&outside));
    }

    #[test]
    fn test_serde_as_string() {
        let block = AddressBlock::parse("192.168.0.0/24").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, "\"192.168.0.0/24\"");
        let decoded: AddressBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, block);

        assert!(serde_json::from_str::<AddressBlock>("\"192.168.0.1/24\"").is_err());
    }
}
