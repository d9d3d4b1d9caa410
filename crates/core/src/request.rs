//! Allocation request model and input validation.
//!
//! Requests arrive as loosely-typed JSON properties from the provisioning
//! workflow:
//!
//! ```json
//! {
//!   "ParentPrefix": "172.16.0.0/12",
//!   "VPC": { "Name": "TestVPC", "BlockSize": "16" },
//!   "Subnets": [ { "Name": "TestSubnet0", "BlockSize": 20 } ]
//! }
//! ```
//!
//! [`validate`] turns them into an [`AllocationRequest`] or reports the first
//! offending property path. Nothing is allocated before validation succeeds.

use crate::block::{AddressBlock, MAX_PREFIX_LEN};
use crate::error::ValidationError;
use serde::Serialize;
use serde_json::Value;

pub const PARENT_PREFIX: &str = "ParentPrefix";
pub const VPC: &str = "VPC";
pub const SUBNETS: &str = "Subnets";
pub const NAME: &str = "Name";
pub const BLOCK_SIZE: &str = "BlockSize";

/// A named block of a requested prefix length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockSpec {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "BlockSize")]
    pub prefix_len: u8,
}

impl BlockSpec {
    pub fn new(name: impl Into<String>, prefix_len: u8) -> Self {
        Self {
            name: name.into(),
            prefix_len,
        }
    }
}

/// A validated allocation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AllocationRequest {
    #[serde(rename = "ParentPrefix")]
    pub parent: AddressBlock,
    #[serde(rename = "VPC")]
    pub vpc: BlockSpec,
    #[serde(rename = "Subnets")]
    pub subnets: Vec<BlockSpec>,
}

/// Validate raw request properties.
///
/// Checks run in a fixed order (parent prefix, VPC, subnets) and the first
/// failure is returned.
pub fn validate(properties: &Value) -> Result<AllocationRequest, ValidationError> {
    let parent = parent_prefix(properties)?;

    let vpc = required(properties, VPC, VPC)?;
    if !vpc.is_object() {
        return Err(ValidationError::new(VPC, "must be an object"));
    }
    let vpc = block_spec(vpc, VPC)?;

    let subnets = required(properties, SUBNETS, SUBNETS)?
        .as_array()
        .ok_or_else(|| ValidationError::new(SUBNETS, "must be a list of subnets"))?;

    let subnets = subnets
        .iter()
        .enumerate()
        .map(|(i, subnet)| {
            let path = format!("{SUBNETS}[{i}]");
            if !subnet.is_object() {
                return Err(ValidationError::new(path, "must be a subnet"));
            }
            block_spec(subnet, &path)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AllocationRequest {
        parent,
        vpc,
        subnets,
    })
}

fn parent_prefix(properties: &Value) -> Result<AddressBlock, ValidationError> {
    let raw = required(properties, PARENT_PREFIX, PARENT_PREFIX)?
        .as_str()
        .ok_or_else(|| ValidationError::new(PARENT_PREFIX, "must be a string"))?;
    AddressBlock::parse(raw).map_err(|e| ValidationError::new(PARENT_PREFIX, e.to_string()))
}

/// Look up `key`, treating JSON `null` as absent.
fn required<'a>(object: &'a Value, key: &str, path: &str) -> Result<&'a Value, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Err(ValidationError::new(path, "cannot be empty")),
        Some(value) => Ok(value),
    }
}

fn block_spec(object: &Value, path: &str) -> Result<BlockSpec, ValidationError> {
    let name_path = format!("{path}.{NAME}");
    let name = required(object, NAME, &name_path)?
        .as_str()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ValidationError::new(&name_path, "must be a non-empty string"))?;

    let size_path = format!("{path}.{BLOCK_SIZE}");
    let prefix_len = prefix_len(required(object, BLOCK_SIZE, &size_path)?, &size_path)?;

    Ok(BlockSpec::new(name, prefix_len))
}

/// Accept an integer or a string holding one; CloudFormation stringifies
/// every property.
fn prefix_len(value: &Value, path: &str) -> Result<u8, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .filter(|len| *len <= u64::from(MAX_PREFIX_LEN))
        .and_then(|len| u8::try_from(len).ok())
        .ok_or_else(|| {
            ValidationError::new(
                path,
                format!("must be an integer between 0 and {MAX_PREFIX_LEN}, got {value}"),
            )
        })
}
