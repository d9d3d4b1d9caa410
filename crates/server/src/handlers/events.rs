//! Provisioning lifecycle endpoint.

use super::parse_json;
use crate::error::{ApiError, ApiResult};
use crate::lifecycle::{self, LifecycleResponse};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

/// POST /v1/events - Handle a lifecycle event and deliver its response.
///
/// The response document is returned as the body whether the event
/// succeeded or failed. Only an undeliverable response is an HTTP error.
#[tracing::instrument(skip(state, body), fields(request_id))]
pub async fn handle_event(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<LifecycleResponse>> {
    let payload = parse_json(&body)?;
    let event = lifecycle::parse_event(&payload).map_err(ApiError::BadRequest)?;
    tracing::Span::current().record("request_id", event.request_id.as_str());

    let response = lifecycle::handle_event(&event, state.ipam.as_ref()).await;

    match event.response_url.as_deref() {
        Some(url) if state.config.server.deliver_responses => {
            lifecycle::deliver(&state.http, url, &response)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to deliver lifecycle response");
                    ApiError::Delivery(e)
                })?;
        }
        Some(_) => tracing::debug!("Response delivery disabled; returning document only"),
        None => tracing::warn!("Event has no ResponseURL; returning document only"),
    }

    Ok(Json(response))
}
