use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::auth::errors::AuthError;
use crate::course::errors::CourseError;
use crate::payment::errors::PaymentError;
use crate::project::errors::ProjectError;
use crate::user::errors::UserError;

pub mod create_project;
pub mod create_qris_payment;
pub mod create_user;
pub mod enroll;
pub mod get_course;
pub mod get_payment_status;
pub mod get_project;
pub mod get_user;
pub mod list_courses;
pub mod list_projects;
pub mod list_users;
pub mod login;
pub mod payment_webhook;
pub mod simulate_payment;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(data)))
    }

    /// Listing response carrying page totals next to `data`.
    pub fn paginated(status: StatusCode, data: T, pagination: PaginationData) -> Self {
        let mut body = ApiResponseBody::new(data);
        body.pagination = Some(pagination);
        ApiSuccess(status, Json(body))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    ServiceUnavailable(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    PaymentRequired(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            ApiError::UnprocessableEntity(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::ServiceUnavailable(detail) => {
                tracing::error!(error = %detail, "Backing store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
        };

        (status, Json(ApiErrorBody::new(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::InvalidUserId(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidName(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidRole(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            UserError::RoleNotConfigured(_)
            | UserError::Password(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::ExternalAuthRequired
            | AuthError::InvalidToken => ApiError::Unauthorized(err.to_string()),
            AuthError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            AuthError::Internal(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidPaymentId(_)
            | PaymentError::InvalidAmount(_)
            | PaymentError::InvalidReference(_)
            | PaymentError::InvalidStatus(_)
            | PaymentError::AmountBelowMinimum { .. }
            | PaymentError::AmountBelowPrice { .. }
            | PaymentError::MalformedWebhook(_)
            | PaymentError::UnsupportedStatus(_) => ApiError::BadRequest(err.to_string()),
            PaymentError::NotFound(_) | PaymentError::PurposeNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            PaymentError::SignatureInvalid => ApiError::Unauthorized(err.to_string()),
            PaymentError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            PaymentError::WebhookSecretMissing | PaymentError::DatabaseError(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::InvalidCourseId(_) => ApiError::BadRequest(err.to_string()),
            CourseError::NotFound(_) | CourseError::StudentNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CourseError::AlreadyEnrolled => ApiError::Conflict(err.to_string()),
            CourseError::PaymentRequired => ApiError::PaymentRequired(err.to_string()),
            CourseError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            CourseError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::InvalidProjectId(_) => ApiError::BadRequest(err.to_string()),
            ProjectError::InvalidField(_) | ProjectError::InvalidBudget(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            ProjectError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ProjectError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            ProjectError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

/// Success envelope: `{success: true, data, pagination?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PaginationData>,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationData {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// Failure envelope: `{success: false, error, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    success: bool,
    error: String,
    message: String,
}

impl ApiErrorBody {
    pub fn new(status_code: StatusCode, message: String) -> Self {
        Self {
            success: false,
            error: status_code
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_domain_errors_map_to_status() {
        assert!(matches!(
            ApiError::from(CourseError::PaymentRequired),
            ApiError::PaymentRequired(_)
        ));
        assert!(matches!(
            ApiError::from(PaymentError::SignatureInvalid),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(PaymentError::UnsupportedStatus("refund".to_string())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::Unavailable("pool timed out".to_string())),
            ApiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(CourseError::StudentNotFound("9".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(PaymentError::AmountBelowPrice {
                price: 150_000,
                actual: 1_000
            }),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(PaymentError::PurposeNotFound("course 9".to_string())),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized("Invalid email or password".to_string())
        );
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let response =
            ApiError::InternalServerError("relation \"users\" does not exist".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = ApiErrorBody::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        );
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "success": false,
                "error": "Internal Server Error",
                "message": "Internal server error",
            })
        );
    }

    #[test]
    fn test_paginated_envelope_shape() {
        let body = ApiSuccess::paginated(
            StatusCode::OK,
            vec![1, 2],
            PaginationData {
                page: 1,
                limit: 12,
                total: 2,
                total_pages: 1,
            },
        );
        assert_eq!(
            serde_json::to_value(&body.1 .0).unwrap(),
            json!({
                "success": true,
                "data": [1, 2],
                "pagination": {"page": 1, "limit": 12, "total": 2, "totalPages": 1},
            })
        );
    }
}
