use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::course::errors::CourseIdError;
use crate::domain::user::models::Rating;
use crate::domain::user::models::UserId;

/// Course unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseId(pub i32);

impl CourseId {
    pub fn new(id: i32) -> Result<Self, CourseIdError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(CourseIdError::NotPositive(id))
        }
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            other => Err(format!("unknown course level '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
            CourseStatus::Archived => "archived",
        }
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "archived" => Ok(CourseStatus::Archived),
            other => Err(format!("unknown course status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instructor {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub level: CourseLevel,
    pub status: CourseStatus,
    pub duration_minutes: i32,
    pub language: String,
    pub is_free: bool,
    pub is_featured: bool,
    pub enrollment_count: i32,
    pub rating: Rating,
    pub review_count: i32,
    pub instructor: Option<Instructor>,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseLesson {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub lesson_type: String,
    pub duration_minutes: i32,
    pub order: i32,
    pub is_preview: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseModule {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub duration_minutes: i32,
    pub lessons: Vec<CourseLesson>,
}

/// A published course with its modules and lessons in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetail {
    pub course: Course,
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "cancelled" => Ok(EnrollmentStatus::Cancelled),
            other => Err(format!("unknown enrollment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: i32,
    pub course_id: CourseId,
    pub student_id: UserId,
    pub status: EnrollmentStatus,
    /// Percent complete, 0 to 100.
    pub progress: f64,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollCommand {
    pub course_id: CourseId,
    pub student_id: UserId,
}

/// Catalog filters. Unset fields do not narrow the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub category_id: Option<i32>,
    pub level: Option<CourseLevel>,
    pub search: Option<String>,
    pub featured_only: bool,
    pub free_only: bool,
}

/// Page window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 12;
    pub const MAX_LIMIT: u32 = 100;

    /// Normalize raw query values: page defaults to 1, limit to 12 and is
    /// capped at 100. Values below 1 fall back to the default.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .map(|p| p.min(u32::MAX as i64) as u32)
            .unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .map(|l| l.min(Self::MAX_LIMIT as i64) as u32)
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the totals needed to page further.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        let limit = self.pagination.limit() as i64;
        (self.total + limit - 1) / limit
    }
}
