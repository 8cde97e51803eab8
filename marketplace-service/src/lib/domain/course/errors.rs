use thiserror::Error;

/// Error for CourseId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CourseIdError {
    #[error("Invalid course ID format: {0}")]
    InvalidFormat(String),

    #[error("Course ID must be positive, got {0}")]
    NotPositive(i32),
}

/// Top-level error for catalog and enrollment operations
#[derive(Debug, Clone, Error)]
pub enum CourseError {
    #[error("Invalid course ID: {0}")]
    InvalidCourseId(#[from] CourseIdError),

    #[error("Course not found: {0}")]
    NotFound(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    #[error("Payment required for this course")]
    PaymentRequired,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
