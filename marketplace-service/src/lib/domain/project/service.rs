use std::sync::Arc;

use async_trait::async_trait;

use super::models::CreateProjectCommand;
use super::models::NewProject;
use super::models::Project;
use super::models::ProjectId;
use super::models::ProjectStatus;
use crate::domain::user::models::UserId;
use crate::project::errors::ProjectError;
use crate::project::ports::ProjectRepository;
use crate::project::ports::ProjectServicePort;

pub struct ProjectService<PR>
where
    PR: ProjectRepository,
{
    repository: Arc<PR>,
}

impl<PR> ProjectService<PR>
where
    PR: ProjectRepository,
{
    pub fn new(repository: Arc<PR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<PR> ProjectServicePort for ProjectService<PR>
where
    PR: ProjectRepository,
{
    async fn create_project(
        &self,
        command: CreateProjectCommand,
        client_id: UserId,
    ) -> Result<Project, ProjectError> {
        let project = NewProject {
            title: command.title.into_inner(),
            description: command.description.into_inner(),
            budget: command.budget,
            category: command.category.into_inner(),
            client_id,
            deadline: command.deadline,
        };

        let created = self.repository.create(project).await?;

        tracing::info!(project_id = %created.id, client_id = %client_id, "Project posted");

        Ok(created)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, ProjectError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProjectError::NotFound(id.to_string()))
    }

    async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, ProjectError> {
        self.repository.list(status).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::project::models::Budget;

    mock! {
        pub TestProjectRepository {}

        #[async_trait]
        impl ProjectRepository for TestProjectRepository {
            async fn create(&self, project: NewProject) -> Result<Project, ProjectError>;
            async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectError>;
            async fn list(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>, ProjectError>;
        }
    }

    fn from_new(id: i32, project: NewProject) -> Project {
        Project {
            id: ProjectId(id),
            title: project.title,
            description: project.description,
            budget: project.budget,
            category: project.category,
            status: ProjectStatus::Open,
            client_id: project.client_id,
            client: None,
            freelancer_id: None,
            deadline: project.deadline,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_project_assigns_authenticated_client() {
        let mut repository = MockTestProjectRepository::new();
        repository
            .expect_create()
            .withf(|project| project.client_id == UserId(12) && project.budget == Budget::new(2500).unwrap())
            .times(1)
            .returning(|project| Ok(from_new(1, project)));

        let service = ProjectService::new(Arc::new(repository));
        let command = CreateProjectCommand::new(
            "Build E-commerce Website".to_string(),
            "Modern storefront".to_string(),
            2500,
            "Web Development".to_string(),
            None,
        )
        .unwrap();

        let project = service.create_project(command, UserId(12)).await.unwrap();
        assert_eq!(project.client_id, UserId(12));
        assert_eq!(project.status, ProjectStatus::Open);
    }

    #[tokio::test]
    async fn test_get_project_not_found() {
        let mut repository = MockTestProjectRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = ProjectService::new(Arc::new(repository));

        let result = service.get_project(ProjectId(404)).await;
        assert!(matches!(result, Err(ProjectError::NotFound(_))));
    }
}
