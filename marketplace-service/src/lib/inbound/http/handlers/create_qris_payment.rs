use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::auth::models::AuthenticatedUser;
use crate::domain::course::models::CourseId;
use crate::domain::payment::models::Amount;
use crate::domain::payment::models::CreatePaymentCommand;
use crate::domain::payment::models::PaymentPurpose;
use crate::domain::payment::models::PaymentRequest;
use crate::domain::project::models::ProjectId;
use crate::inbound::http::router::AppState;

/// Start a QRIS checkout for a project or a course on behalf of the caller.
pub async fn create_qris_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateQrisPaymentRequest>, JsonRejection>,
) -> Result<ApiSuccess<PaymentData>, ApiError> {
    let Json(body) = payload?;

    let purpose = body.purpose()?;
    let amount = Amount::new(body.amount).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::debug!(
        payer_id = %caller.user_id,
        purpose = purpose.kind(),
        target_id = purpose.target_id(),
        description = body.description.as_deref().unwrap_or_default(),
        "QRIS checkout requested"
    );

    let command = CreatePaymentCommand {
        amount,
        reference: None,
        payer_id: Some(caller.user_id),
        purpose: Some(purpose),
    };

    state
        .payment_service
        .create_payment_request(command)
        .await
        .map_err(ApiError::from)
        .map(|ref payment| ApiSuccess::new(StatusCode::CREATED, payment.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrisPaymentRequest {
    #[serde(default)]
    project_id: Option<i32>,
    #[serde(default)]
    course_id: Option<i32>,
    amount: i64,
    #[serde(default)]
    description: Option<String>,
}

impl CreateQrisPaymentRequest {
    /// Exactly one of `projectId` and `courseId` names what is paid for.
    fn purpose(&self) -> Result<PaymentPurpose, ApiError> {
        match (self.project_id, self.course_id) {
            (Some(id), None) => ProjectId::new(id)
                .map(PaymentPurpose::Project)
                .map_err(|e| ApiError::BadRequest(e.to_string())),
            (None, Some(id)) => CourseId::new(id)
                .map(PaymentPurpose::Course)
                .map_err(|e| ApiError::BadRequest(e.to_string())),
            (Some(_), Some(_)) => Err(ApiError::BadRequest(
                "Provide either projectId or courseId, not both".to_string(),
            )),
            (None, None) => Err(ApiError::BadRequest(
                "Either projectId or courseId is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurposeData {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub payment_id: String,
    pub amount: i64,
    pub reference: String,
    pub qris_string: String,
    pub status: &'static str,
    pub purpose: Option<PurposeData>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PaymentRequest> for PaymentData {
    fn from(payment: &PaymentRequest) -> Self {
        Self {
            payment_id: payment.id.as_str().to_string(),
            amount: payment.amount.value(),
            reference: payment.reference.as_str().to_string(),
            qris_string: payment.qris_string.clone(),
            status: payment.status.as_str(),
            purpose: payment.purpose.map(|p| PurposeData {
                kind: p.kind(),
                id: p.target_id(),
            }),
            created_at: payment.created_at,
            expires_at: payment.expires_at,
            updated_at: payment.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(project_id: Option<i32>, course_id: Option<i32>) -> CreateQrisPaymentRequest {
        CreateQrisPaymentRequest {
            project_id,
            course_id,
            amount: 50_000,
            description: None,
        }
    }

    #[test]
    fn test_exactly_one_purpose_required() {
        assert_eq!(
            request(Some(7), None).purpose(),
            Ok(PaymentPurpose::Project(ProjectId(7)))
        );
        assert_eq!(
            request(None, Some(3)).purpose(),
            Ok(PaymentPurpose::Course(CourseId(3)))
        );
        assert!(matches!(
            request(Some(7), Some(3)).purpose(),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            request(None, None).purpose(),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            request(Some(0), None).purpose(),
            Err(ApiError::BadRequest(_))
        ));
    }
}
