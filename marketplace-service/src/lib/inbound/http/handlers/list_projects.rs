use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::get_project::ProjectData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::project::models::ProjectStatus;
use crate::inbound::http::router::AppState;

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> Result<ApiSuccess<Vec<ProjectData>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ProjectStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    state
        .project_service
        .list_projects(status)
        .await
        .map_err(ApiError::from)
        .map(|projects| {
            ApiSuccess::new(
                StatusCode::OK,
                projects.iter().map(ProjectData::from).collect(),
            )
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListProjectsQuery {
    status: Option<String>,
}
