use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::create_qris_payment::PaymentData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::payment::models::PaymentId;
use crate::domain::payment::models::TerminalStatus;
use crate::inbound::http::router::AppState;

/// Development hook: drive a payment as the provider would. Only routed
/// when simulation is enabled in configuration.
pub async fn simulate_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    payload: Result<Json<SimulatePaymentRequest>, JsonRejection>,
) -> Result<ApiSuccess<PaymentData>, ApiError> {
    let Json(body) = payload?;

    let payment_id =
        PaymentId::from_string(&payment_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let status = body
        .status
        .trim()
        .to_ascii_lowercase()
        .parse::<TerminalStatus>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .payment_service
        .simulate_provider_callback(&payment_id, status)
        .await
        .map_err(ApiError::from)
        .map(|ref payment| ApiSuccess::new(StatusCode::OK, payment.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulatePaymentRequest {
    status: String,
}
