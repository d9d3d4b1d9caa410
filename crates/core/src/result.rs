//! Allocation result mapping.

use crate::block::AddressBlock;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix appended to every logical name to form its output key.
pub const CIDR_BLOCK_SUFFIX: &str = ".CidrBlock";

/// Ordered mapping of `"<Name>.CidrBlock"` keys to assigned blocks.
///
/// Keys keep their first insertion position. Inserting an existing key
/// replaces its value in place, so duplicate names resolve to the last
/// block assigned under that name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocationResult {
    entries: Vec<(String, AddressBlock)>,
}

impl AllocationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output key for a logical name.
    pub fn key_for(name: &str) -> String {
        format!("{name}{CIDR_BLOCK_SUFFIX}")
    }

    /// Record the block assigned to `name`.
    pub fn insert(&mut self, name: &str, block: AddressBlock) {
        self.insert_key(Self::key_for(name), block);
    }

    fn insert_key(&mut self, key: String, block: AddressBlock) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = block,
            None => self.entries.push((key, block)),
        }
    }

    /// Look up by full output key (`"Name.CidrBlock"`).
    pub fn get(&self, key: &str) -> Option<&AddressBlock> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, b)| b)
    }

    /// Look up by logical name.
    pub fn block_for(&self, name: &str) -> Option<&AddressBlock> {
        self.get(&Self::key_for(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AddressBlock)> {
        self.entries.iter().map(|(k, b)| (k.as_str(), b))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn blocks(&self) -> impl Iterator<Item = &AddressBlock> {
        self.entries.iter().map(|(_, b)| b)
    }
}

impl Serialize for AllocationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, block) in &self.entries {
            map.serialize_entry(key, block)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AllocationResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultVisitor;

        impl<'de> Visitor<'de> for ResultVisitor {
            type Value = AllocationResult;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of \"<Name>.CidrBlock\" keys to CIDR blocks")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut result = AllocationResult::new();
                while let Some((key, block)) = access.next_entry::<String, AddressBlock>()? {
                    if !key.ends_with(CIDR_BLOCK_SUFFIX) {
                        return Err(de::Error::custom(format!(
                            "key {key:?} does not end with {CIDR_BLOCK_SUFFIX}"
                        )));
                    }
                    result.insert_key(key, block);
                }
                Ok(result)
            }
        }

        deserializer.deserialize_map(ResultVisitor)
    }
}
