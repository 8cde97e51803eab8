use thiserror::Error;

/// Error for ProjectId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectIdError {
    #[error("Invalid project ID format: {0}")]
    InvalidFormat(String),

    #[error("Project ID must be positive, got {0}")]
    NotPositive(i32),
}

/// Error for required project text fields
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectFieldError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Error for Budget validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("Budget must be positive, got {0}")]
    NotPositive(i64),
}

/// Top-level error for all project-related operations
#[derive(Debug, Clone, Error)]
pub enum ProjectError {
    #[error("Invalid project ID: {0}")]
    InvalidProjectId(#[from] ProjectIdError),

    #[error("Invalid field: {0}")]
    InvalidField(#[from] ProjectFieldError),

    #[error("Invalid budget: {0}")]
    InvalidBudget(#[from] BudgetError),

    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
