use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::create_qris_payment::PaymentData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::payment::models::PaymentId;
use crate::inbound::http::router::AppState;

pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<ApiSuccess<PaymentData>, ApiError> {
    let payment_id =
        PaymentId::from_string(&payment_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .payment_service
        .get_status(&payment_id)
        .await
        .map_err(ApiError::from)
        .map(|ref payment| ApiSuccess::new(StatusCode::OK, payment.into()))
}
