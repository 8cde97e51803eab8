use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use super::is_unavailable;
use crate::domain::project::models::Budget;
use crate::domain::project::models::NewProject;
use crate::domain::project::models::Project;
use crate::domain::project::models::ProjectClient;
use crate::domain::project::models::ProjectId;
use crate::domain::project::models::ProjectStatus;
use crate::domain::project::ports::ProjectRepository;
use crate::domain::user::models::UserId;
use crate::project::errors::ProjectError;

const PROJECT_SELECT: &str = r#"
    SELECT
        p.id,
        p.title,
        p.description,
        p.budget,
        p.category,
        p.status,
        p.client_id,
        p.freelancer_id,
        p.deadline,
        p.created_at,
        c.name AS client_name,
        c.email AS client_email,
        r.name AS client_role
    FROM projects p
    LEFT JOIN users c ON c.id = p.client_id AND c.deleted_at IS NULL
    LEFT JOIN roles r ON r.id = c.role_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: i32,
    title: String,
    description: String,
    budget: i64,
    category: String,
    status: String,
    client_id: i32,
    freelancer_id: Option<i32>,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    client_name: Option<String>,
    client_email: Option<String>,
    client_role: Option<String>,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project, ProjectError> {
        let status = self
            .status
            .parse::<ProjectStatus>()
            .map_err(ProjectError::DatabaseError)?;
        let budget = Budget::new(self.budget)?;

        let client = match (self.client_name, self.client_email, self.client_role) {
            (Some(name), Some(email), Some(role)) => Some(ProjectClient {
                id: UserId(self.client_id),
                name,
                email,
                role,
            }),
            _ => None,
        };

        Ok(Project {
            id: ProjectId(self.id),
            title: self.title,
            description: self.description,
            budget,
            category: self.category,
            status,
            client_id: UserId(self.client_id),
            client,
            freelancer_id: self.freelancer_id.map(UserId),
            deadline: self.deadline,
            created_at: self.created_at,
        })
    }
}

fn store_error(err: sqlx::Error) -> ProjectError {
    tracing::error!(error = %err, "Project query failed");
    if is_unavailable(&err) {
        ProjectError::Unavailable(err.to_string())
    } else {
        ProjectError::DatabaseError(err.to_string())
    }
}

/// PostgreSQL implementation of ProjectRepository.
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create(&self, project: NewProject) -> Result<Project, ProjectError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO projects (title, description, budget, category, client_id, deadline)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.budget.value())
        .bind(&project.category)
        .bind(project.client_id.as_i32())
        .bind(project.deadline)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        self.find_by_id(ProjectId(id))
            .await?
            .ok_or(ProjectError::NotFound(id.to_string()))
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectError> {
        let sql = format!("{PROJECT_SELECT} WHERE p.id = $1");

        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(ProjectRow::into_project).transpose()
    }

    async fn list(&self, status: Option<ProjectStatus>) -> Result<Vec<Project>, ProjectError> {
        let sql = format!(
            "{PROJECT_SELECT} WHERE ($1::TEXT IS NULL OR p.status = $1) ORDER BY p.created_at DESC"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }
}
