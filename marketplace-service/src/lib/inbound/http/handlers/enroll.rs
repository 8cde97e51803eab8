use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::course::models::CourseId;
use crate::domain::course::models::EnrollCommand;
use crate::domain::course::models::Enrollment;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn enroll(
    State(state): State<AppState>,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<ApiSuccess<EnrollmentData>, ApiError> {
    let Json(body) = payload?;

    let command = EnrollCommand {
        course_id: CourseId::new(body.course_id)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        student_id: UserId::new(body.user_id).map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    state
        .course_service
        .enroll(command)
        .await
        .map_err(ApiError::from)
        .map(|ref enrollment| ApiSuccess::new(StatusCode::CREATED, enrollment.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    course_id: i32,
    user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentData {
    pub id: i32,
    pub course_id: i32,
    pub student_id: i32,
    pub status: &'static str,
    pub progress: f64,
    pub enrolled_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentData {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: enrollment.id,
            course_id: enrollment.course_id.as_i32(),
            student_id: enrollment.student_id.as_i32(),
            status: enrollment.status.as_str(),
            progress: enrollment.progress,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}
