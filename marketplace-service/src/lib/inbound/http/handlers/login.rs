use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::get_user::UserData;
use super::ApiError;
use crate::inbound::http::router::AppState;

/// `POST /api/auth/login`.
///
/// Responds with the flat `{success, token, user}` shape rather than the
/// `data` envelope.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;

    let (email, password) = match (body.email, body.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ))
        }
    };

    let session = state
        .auth_service
        .authenticate(email.trim(), &password)
        .await
        .map_err(|e| {
            tracing::info!(reason = %e, "Login rejected");
            ApiError::from(e)
        })?;

    let response = LoginResponseBody {
        success: true,
        token: session.token,
        expires_at: session.expires_at,
        user: (&session.user).into(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Both fields are optional so a missing one is a 400, not a 422.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseBody {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserData,
}
