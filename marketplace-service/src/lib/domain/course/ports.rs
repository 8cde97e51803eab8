use async_trait::async_trait;

use super::models::Course;
use super::models::CourseDetail;
use super::models::CourseFilter;
use super::models::CourseId;
use super::models::EnrollCommand;
use super::models::Enrollment;
use super::models::Page;
use super::models::Pagination;
use crate::course::errors::CourseError;
use crate::domain::user::models::UserId;

/// Port for catalog browsing and enrollment.
#[async_trait]
pub trait CourseServicePort: Send + Sync + 'static {
    /// Published courses matching `filter`, newest first.
    async fn list_courses(
        &self,
        filter: CourseFilter,
        pagination: Pagination,
    ) -> Result<Page<Course>, CourseError>;

    /// # Errors
    /// * `NotFound` - No published course with this slug
    async fn get_course(&self, slug: &str) -> Result<CourseDetail, CourseError>;

    /// Enroll a student in a published course.
    ///
    /// # Errors
    /// * `NotFound` - Course missing or unpublished
    /// * `AlreadyEnrolled` - Student holds an active enrollment
    /// * `PaymentRequired` - Course is not free and no paid payment exists
    /// * `StudentNotFound` - Student id does not reference a user
    async fn enroll(&self, command: EnrollCommand) -> Result<Enrollment, CourseError>;
}

/// Persistence operations for the course catalog and enrollments.
#[async_trait]
pub trait CourseRepository: Send + Sync + 'static {
    /// Page of published courses plus the total match count.
    async fn list_published(
        &self,
        filter: &CourseFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Course>, i64), CourseError>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<CourseDetail>, CourseError>;

    async fn find_published_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseError>;

    async fn find_active_enrollment(
        &self,
        course_id: CourseId,
        student_id: UserId,
    ) -> Result<Option<Enrollment>, CourseError>;

    /// Insert an active enrollment and bump the course's enrollment count in
    /// one transaction.
    ///
    /// # Errors
    /// * `AlreadyEnrolled` - A concurrent request created the active row first
    /// * `StudentNotFound` - Student id does not reference a user
    async fn create_enrollment(
        &self,
        course_id: CourseId,
        student_id: UserId,
    ) -> Result<Enrollment, CourseError>;
}
