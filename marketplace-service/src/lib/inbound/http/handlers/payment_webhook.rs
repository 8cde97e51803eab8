use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Provider callback. The body is taken as raw bytes so the signature is
/// checked over exactly what was sent.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiSuccess<WebhookReceivedData>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let ack = state
        .payment_service
        .handle_webhook(&body, signature)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        payment_id = %ack.payment_id,
        status = ?ack.status.map(|s| s.as_str()),
        applied = ack.applied,
        "Payment webhook acknowledged"
    );

    Ok(ApiSuccess::new(
        StatusCode::OK,
        WebhookReceivedData { received: true },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookReceivedData {
    pub received: bool,
}
