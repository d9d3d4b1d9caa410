use serde_json::{Value, json};
use vpcalloc_core::AddressBlock;

/// Parse a CIDR block, panicking on bad test input.
#[allow(dead_code)]
pub fn block(s: &str) -> AddressBlock {
    AddressBlock::parse(s).expect("valid test block")
}

/// Request properties with `subnets` `/size` subnets named `TestSubnet<K>`.
#[allow(dead_code)]
pub fn scenario_properties(parent: &str, vpc_size: u8, subnets: &[u8]) -> Value {
    let subnets: Vec<Value> = subnets
        .iter()
        .enumerate()
        .map(|(k, size)| json!({"Name": format!("TestSubnet{k}"), "BlockSize": size.to_string()}))
        .collect();
    json!({
        "ParentPrefix": parent,
        "VPC": {"Name": "TestVPC", "BlockSize": vpc_size.to_string()},
        "Subnets": subnets,
    })
}
