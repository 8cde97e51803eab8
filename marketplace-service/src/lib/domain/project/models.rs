use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::UserId;
use crate::project::errors::BudgetError;
use crate::project::errors::ProjectFieldError;
use crate::project::errors::ProjectIdError;

/// Project unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub i32);

impl ProjectId {
    pub fn new(id: i32) -> Result<Self, ProjectIdError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(ProjectIdError::NotPositive(id))
        }
    }

    pub fn from_string(s: &str) -> Result<Self, ProjectIdError> {
        let id = s
            .trim()
            .parse::<i32>()
            .map_err(|e| ProjectIdError::InvalidFormat(e.to_string()))?;
        Self::new(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProjectStatus::Open),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            other => Err(format!("unknown project status '{}'", other)),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client who posted a project, joined from `users`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectClient {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Project aggregate entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub budget: Budget,
    pub category: String,
    pub status: ProjectStatus,
    pub client_id: UserId,
    pub client: Option<ProjectClient>,
    pub freelancer_id: Option<UserId>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Project budget in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Budget(i64);

impl Budget {
    pub fn new(value: i64) -> Result<Self, BudgetError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(BudgetError::NotPositive(value))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Non-empty, bounded text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredText(String);

impl RequiredText {
    pub fn new(field: &'static str, value: String, max: usize) -> Result<Self, ProjectFieldError> {
        let trimmed = value.trim();
        let length = trimmed.chars().count();
        if length == 0 {
            Err(ProjectFieldError::Missing(field))
        } else if length > max {
            Err(ProjectFieldError::TooLong {
                field,
                max,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Command to post a new project with domain types
#[derive(Debug, Clone)]
pub struct CreateProjectCommand {
    pub title: RequiredText,
    pub description: RequiredText,
    pub budget: Budget,
    pub category: RequiredText,
    pub deadline: Option<DateTime<Utc>>,
}

impl CreateProjectCommand {
    pub const TITLE_MAX: usize = 200;
    pub const DESCRIPTION_MAX: usize = 10_000;
    pub const CATEGORY_MAX: usize = 100;

    pub fn new(
        title: String,
        description: String,
        budget: i64,
        category: String,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Self, crate::project::errors::ProjectError> {
        Ok(Self {
            title: RequiredText::new("title", title, Self::TITLE_MAX)?,
            description: RequiredText::new("description", description, Self::DESCRIPTION_MAX)?,
            budget: Budget::new(budget)?,
            category: RequiredText::new("category", category, Self::CATEGORY_MAX)?,
            deadline,
        })
    }
}

/// Row to insert for a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub budget: Budget,
    pub category: String,
    pub client_id: UserId,
    pub deadline: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::errors::ProjectError;

    #[test]
    fn test_create_project_command_validation() {
        let command = CreateProjectCommand::new(
            "  Build a shop  ".to_string(),
            "Storefront with checkout".to_string(),
            2_500_000,
            "Web Development".to_string(),
            None,
        )
        .unwrap();
        assert_eq!(command.title.as_str(), "Build a shop");

        let missing = CreateProjectCommand::new(
            "".to_string(),
            "d".to_string(),
            1,
            "c".to_string(),
            None,
        );
        assert!(matches!(
            missing,
            Err(ProjectError::InvalidField(ProjectFieldError::Missing("title")))
        ));

        let free = CreateProjectCommand::new(
            "t".to_string(),
            "d".to_string(),
            0,
            "c".to_string(),
            None,
        );
        assert!(matches!(free, Err(ProjectError::InvalidBudget(_))));
    }

    #[test]
    fn test_project_status_round_trip_names() {
        assert_eq!("in_progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::Cancelled.as_str(), "cancelled");
        assert!("archived".parse::<ProjectStatus>().is_err());
    }
}
