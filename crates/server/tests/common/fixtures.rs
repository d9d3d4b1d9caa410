//! Request and event fixtures.

use serde_json::{Value, json};

/// Allocation properties: a `TestVPC` of `vpc_size` and one `TestSubnet<k>`
/// per entry of `subnet_sizes`.
#[allow(dead_code)]
pub fn allocation_properties(parent: &str, vpc_size: u8, subnet_sizes: &[u8]) -> Value {
    let subnets: Vec<Value> = subnet_sizes
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

/// A lifecycle event carrying `properties`.
#[allow(dead_code)]
pub fn lifecycle_event(request_type: &str, response_url: &str, properties: Value) -> Value {
    json!({
        "RequestType": request_type,
        "ResponseURL": response_url,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/network/0000",
        "RequestId": "5d2c4b3a-0000-0000-0000-000000000001",
        "LogicalResourceId": "NetworkBlocks",
        "ResourceType": "Custom::NetworkBlocks",
        "ResourceProperties": properties,
    })
}

/// Wrap an event in an SNS notification envelope.
#[allow(dead_code)]
pub fn sns_envelope(event: &Value) -> Value {
    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "Sns": {"Type": "Notification", "Message": event.to_string()}
        }]
    })
}
