use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::project::models::Project;
use crate::domain::project::models::ProjectClient;
use crate::domain::project::models::ProjectId;
use crate::inbound::http::router::AppState;

pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<ApiSuccess<ProjectData>, ApiError> {
    let project_id =
        ProjectId::from_string(&project_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .project_service
        .get_project(project_id)
        .await
        .map_err(ApiError::from)
        .map(|ref project| ApiSuccess::new(StatusCode::OK, project.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectClientData {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&ProjectClient> for ProjectClientData {
    fn from(client: &ProjectClient) -> Self {
        Self {
            id: client.id.as_i32(),
            name: client.name.clone(),
            email: client.email.clone(),
            role: client.role.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub budget: i64,
    pub category: String,
    pub status: &'static str,
    pub client_id: i32,
    pub client: Option<ProjectClientData>,
    pub freelancer_id: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectData {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.as_i32(),
            title: project.title.clone(),
            description: project.description.clone(),
            budget: project.budget.value(),
            category: project.category.clone(),
            status: project.status.as_str(),
            client_id: project.client_id.as_i32(),
            client: project.client.as_ref().map(ProjectClientData::from),
            freelancer_id: project.freelancer_id.map(|id| id.as_i32()),
            deadline: project.deadline,
            created_at: project.created_at,
        }
    }
}
