use async_trait::async_trait;

use super::models::CreateProjectCommand;
use super::models::NewProject;
use super::models::Project;
use super::models::ProjectId;
use super::models::ProjectStatus;
use crate::domain::user::models::UserId;
use crate::project::errors::ProjectError;

/// Port for project domain service operations.
#[async_trait]
pub trait ProjectServicePort: Send + Sync + 'static {
    /// Post a project on behalf of the authenticated client.
    async fn create_project(
        &self,
        command: CreateProjectCommand,
        client_id: UserId,
    ) -> Result<Project, ProjectError>;

    /// # Errors
    /// * `NotFound` - Project does not exist
    async fn get_project(&self, id: ProjectId) -> Result<Project, ProjectError>;

    /// List projects newest first, optionally narrowed to one status.
    async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, ProjectError>;
}

/// Persistence operations for projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync + 'static {
    async fn create(&self, project: NewProject) -> Result<Project, ProjectError>;

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectError>;

    async fn list(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>, ProjectError>;
}
