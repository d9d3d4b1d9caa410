//! Provisioning lifecycle events.
//!
//! A provisioning engine sends Create/Update/Delete events for a custom
//! resource and waits for a response document at the event's `ResponseURL`.
//! Only Create allocates; Update and Delete acknowledge without touching the
//! IPAM authority, so blocks reserved on Create are never released here.

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vpcalloc_core::AllocationResult;
use vpcalloc_ipam::{IpamAuthority, allocate_properties};

/// Lifecycle request kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// A custom-resource lifecycle event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_properties: Value,
}

/// Outcome reported back to the provisioning engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Response document for a lifecycle event.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: AllocationResult,
}

/// Parse an event, unwrapping an SNS notification envelope if present.
///
/// With an envelope, the first record's message is the event.
pub fn parse_event(body: &Value) -> Result<LifecycleEvent, String> {
    if let Some(records) = body.get("Records") {
        let message = records
            .get(0)
            .and_then(|r| r.get("Sns"))
            .and_then(|sns| sns.get("Message"))
            .and_then(Value::as_str)
            .ok_or("SNS envelope has no Records[0].Sns.Message")?;
        tracing::debug!("Unwrapping SNS notification");
        return serde_json::from_str(message).map_err(|e| format!("invalid SNS message: {e}"));
    }

    serde_json::from_value(body.clone()).map_err(|e| format!("invalid lifecycle event: {e}"))
}

/// Physical resource id for a newly created resource: the logical id plus
/// eight random hex characters.
pub fn generate_physical_id(logical_resource_id: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{logical_resource_id}_{}", &suffix[..8])
}

/// Handle an event and build its response document.
///
/// Allocation failures become a `FAILED` response; this never errors.
#[tracing::instrument(
    skip(event, ipam),
    fields(
        request_type = ?event.request_type,
        logical_resource_id = %event.logical_resource_id,
        request_id = %event.request_id,
    )
)]
pub async fn handle_event(event: &LifecycleEvent, ipam: &dyn IpamAuthority) -> LifecycleResponse {
    let physical_resource_id = event
        .physical_resource_id
        .clone()
        .unwrap_or_else(|| generate_physical_id(&event.logical_resource_id));

    let outcome = match event.request_type {
        RequestType::Create => {
            tracing::info!("Received Create event");
            allocate_properties(&event.resource_properties, ipam).await
        }
        RequestType::Update => {
            tracing::info!("Received Update event");
            Ok(AllocationResult::new())
        }
        RequestType::Delete => {
            tracing::info!("Received Delete event");
            Ok(AllocationResult::new())
        }
    };

    let (status, reason, data) = match outcome {
        Ok(data) => (ResponseStatus::Success, None, data),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "Lifecycle event failed");
            (
                ResponseStatus::Failed,
                Some(e.to_string()),
                AllocationResult::new(),
            )
        }
    };

    LifecycleResponse {
        status,
        reason,
        physical_resource_id,
        stack_id: event.stack_id.clone(),
        request_id: event.request_id.clone(),
        logical_resource_id: event.logical_resource_id.clone(),
        no_echo: false,
        data,
    }
}

/// PUT the response document to the event's response URL.
///
/// Presigned response URLs are signed without a content type, so the header
/// is sent empty.
#[tracing::instrument(skip(http, response), fields(status = ?response.status))]
pub async fn deliver(
    http: &reqwest::Client,
    response_url: &str,
    response: &LifecycleResponse,
) -> Result<(), String> {
    let body = serde_json::to_vec(response).map_err(|e| e.to_string())?;

    let resp = http
        .put(response_url)
        .header(CONTENT_TYPE, "")
        .body(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(format!("response URL returned {status}: {body}"));
    }

    tracing::debug!("Lifecycle response delivered");
    Ok(())
}
