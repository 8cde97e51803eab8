use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;

use super::get_project::ProjectData;
use super::ApiError;
use super::ApiSuccess;
use crate::auth::models::AuthenticatedUser;
use crate::domain::project::models::CreateProjectCommand;
use crate::inbound::http::router::AppState;

/// Post a project. The caller becomes its client.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<ApiSuccess<ProjectData>, ApiError> {
    let Json(body) = payload?;

    let command = CreateProjectCommand::new(
        body.title,
        body.description,
        body.budget,
        body.category,
        body.deadline,
    )?;

    state
        .project_service
        .create_project(command, caller.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref project| ApiSuccess::new(StatusCode::CREATED, project.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateProjectRequest {
    title: String,
    description: String,
    budget: i64,
    category: String,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
}
