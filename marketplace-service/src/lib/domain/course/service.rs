use std::sync::Arc;

use async_trait::async_trait;

use super::models::Course;
use super::models::CourseDetail;
use super::models::CourseFilter;
use super::models::EnrollCommand;
use super::models::Enrollment;
use super::models::Page;
use super::models::Pagination;
use crate::course::errors::CourseError;
use crate::course::ports::CourseRepository;
use crate::course::ports::CourseServicePort;
use crate::domain::payment::models::PaymentPurpose;
use crate::payment::errors::PaymentError;
use crate::payment::ports::PaymentStore;

/// Catalog and enrollment service.
///
/// Paid courses are gated on a settled payment found in the payment store.
pub struct CourseService<CR, PS>
where
    CR: CourseRepository,
    PS: PaymentStore,
{
    repository: Arc<CR>,
    payments: Arc<PS>,
}

impl<CR, PS> CourseService<CR, PS>
where
    CR: CourseRepository,
    PS: PaymentStore,
{
    pub fn new(repository: Arc<CR>, payments: Arc<PS>) -> Self {
        Self {
            repository,
            payments,
        }
    }
}

fn payment_lookup_error(err: PaymentError) -> CourseError {
    match err {
        PaymentError::Unavailable(msg) => CourseError::Unavailable(msg),
        other => CourseError::DatabaseError(other.to_string()),
    }
}

#[async_trait]
impl<CR, PS> CourseServicePort for CourseService<CR, PS>
where
    CR: CourseRepository,
    PS: PaymentStore,
{
    async fn list_courses(
        &self,
        filter: CourseFilter,
        pagination: Pagination,
    ) -> Result<Page<Course>, CourseError> {
        let (items, total) = self.repository.list_published(&filter, pagination).await?;

        Ok(Page {
            items,
            pagination,
            total,
        })
    }

    async fn get_course(&self, slug: &str) -> Result<CourseDetail, CourseError> {
        self.repository
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| CourseError::NotFound(slug.to_string()))
    }

    async fn enroll(&self, command: EnrollCommand) -> Result<Enrollment, CourseError> {
        let course = self
            .repository
            .find_published_by_id(command.course_id)
            .await?
            .ok_or(CourseError::NotFound(command.course_id.to_string()))?;

        if self
            .repository
            .find_active_enrollment(course.id, command.student_id)
            .await?
            .is_some()
        {
            return Err(CourseError::AlreadyEnrolled);
        }

        if !course.is_free {
            let paid = self
                .payments
                .has_paid(
                    command.student_id,
                    PaymentPurpose::Course(course.id),
                    course.price,
                )
                .await
                .map_err(payment_lookup_error)?;

            if !paid {
                tracing::info!(
                    course_id = %course.id,
                    student_id = %command.student_id,
                    "Enrollment refused without settled payment"
                );
                return Err(CourseError::PaymentRequired);
            }
        }

        let enrollment = self
            .repository
            .create_enrollment(course.id, command.student_id)
            .await?;

        tracing::info!(
            enrollment_id = enrollment.id,
            course_id = %course.id,
            student_id = %command.student_id,
            "Student enrolled"
        );

        Ok(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::course::models::CourseId;
    use crate::domain::course::models::CourseLevel;
    use crate::domain::course::models::CourseStatus;
    use crate::domain::course::models::EnrollmentStatus;
    use crate::domain::payment::models::PaymentId;
    use crate::domain::payment::models::PaymentRequest;
    use crate::domain::payment::models::TerminalStatus;
    use crate::domain::payment::models::TransitionOutcome;
    use crate::domain::user::models::Rating;
    use crate::domain::user::models::UserId;

    mock! {
        pub TestCourseRepository {}

        #[async_trait]
        impl CourseRepository for TestCourseRepository {
            async fn list_published(&self, filter: &CourseFilter, pagination: Pagination) -> Result<(Vec<Course>, i64), CourseError>;
            async fn find_published_by_slug(&self, slug: &str) -> Result<Option<CourseDetail>, CourseError>;
            async fn find_published_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseError>;
            async fn find_active_enrollment(&self, course_id: CourseId, student_id: UserId) -> Result<Option<Enrollment>, CourseError>;
            async fn create_enrollment(&self, course_id: CourseId, student_id: UserId) -> Result<Enrollment, CourseError>;
        }
    }

    mock! {
        pub TestPaymentStore {}

        #[async_trait]
        impl PaymentStore for TestPaymentStore {
            async fn insert(&self, payment: PaymentRequest) -> Result<PaymentRequest, PaymentError>;
            async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRequest>, PaymentError>;
            async fn transition_from_pending(&self, id: &PaymentId, target: TerminalStatus, at: DateTime<Utc>) -> Result<Option<TransitionOutcome>, PaymentError>;
            async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<Vec<PaymentRequest>, PaymentError>;
            async fn has_paid(&self, payer: UserId, purpose: PaymentPurpose, at_least: i64) -> Result<bool, PaymentError>;
            async fn mark_event_published(&self, id: &PaymentId, at: DateTime<Utc>) -> Result<(), PaymentError>;
            async fn find_undelivered(&self, limit: i64) -> Result<Vec<PaymentRequest>, PaymentError>;
        }
    }

    fn course(id: i32, is_free: bool) -> Course {
        Course {
            id: CourseId(id),
            title: "Rust for Backend Engineers".to_string(),
            slug: "rust-backend".to_string(),
            description: None,
            short_description: None,
            thumbnail_url: None,
            price: if is_free { 0 } else { 150_000 },
            original_price: None,
            level: CourseLevel::Intermediate,
            status: CourseStatus::Published,
            duration_minutes: 600,
            language: "id".to_string(),
            is_free,
            is_featured: false,
            enrollment_count: 0,
            rating: Rating::default(),
            review_count: 0,
            instructor: None,
            category: None,
            created_at: Utc::now(),
            published_at: Some(Utc::now()),
        }
    }

    fn enrollment(course_id: CourseId, student_id: UserId) -> Enrollment {
        Enrollment {
            id: 1,
            course_id,
            student_id,
            status: EnrollmentStatus::Active,
            progress: 0.0,
            enrolled_at: Utc::now(),
        }
    }

    fn command() -> EnrollCommand {
        EnrollCommand {
            course_id: CourseId(3),
            student_id: UserId(5),
        }
    }

    #[tokio::test]
    async fn test_paid_course_without_payment_requires_payment() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_find_published_by_id()
            .returning(|id| Ok(Some(course(id.as_i32(), false))));
        repository
            .expect_find_active_enrollment()
            .returning(|_, _| Ok(None));
        repository.expect_create_enrollment().never();

        let mut payments = MockTestPaymentStore::new();
        payments
            .expect_has_paid()
            .with(
                eq(UserId(5)),
                eq(PaymentPurpose::Course(CourseId(3))),
                eq(150_000),
            )
            .times(1)
            .returning(|_, _, _| Ok(false));

        let service = CourseService::new(Arc::new(repository), Arc::new(payments));

        let result = service.enroll(command()).await;
        assert!(matches!(result, Err(CourseError::PaymentRequired)));
    }

    #[tokio::test]
    async fn test_paid_course_with_settled_payment_enrolls() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_find_published_by_id()
            .returning(|id| Ok(Some(course(id.as_i32(), false))));
        repository
            .expect_find_active_enrollment()
            .returning(|_, _| Ok(None));
        repository
            .expect_create_enrollment()
            .times(1)
            .returning(|course_id, student_id| Ok(enrollment(course_id, student_id)));

        let mut payments = MockTestPaymentStore::new();
        payments.expect_has_paid().returning(|_, _, _| Ok(true));

        let service = CourseService::new(Arc::new(repository), Arc::new(payments));

        let enrolled = service.enroll(command()).await.unwrap();
        assert_eq!(enrolled.status, EnrollmentStatus::Active);
        assert_eq!(enrolled.student_id, UserId(5));
    }

    #[tokio::test]
    async fn test_free_course_skips_payment_check() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_find_published_by_id()
            .returning(|id| Ok(Some(course(id.as_i32(), true))));
        repository
            .expect_find_active_enrollment()
            .returning(|_, _| Ok(None));
        repository
            .expect_create_enrollment()
            .times(1)
            .returning(|course_id, student_id| Ok(enrollment(course_id, student_id)));

        let mut payments = MockTestPaymentStore::new();
        payments.expect_has_paid().never();

        let service = CourseService::new(Arc::new(repository), Arc::new(payments));

        assert!(service.enroll(command()).await.is_ok());
    }

    #[tokio::test]
    async fn test_existing_active_enrollment_conflicts() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_find_published_by_id()
            .returning(|id| Ok(Some(course(id.as_i32(), true))));
        repository
            .expect_find_active_enrollment()
            .returning(|course_id, student_id| Ok(Some(enrollment(course_id, student_id))));
        repository.expect_create_enrollment().never();

        let service = CourseService::new(Arc::new(repository), Arc::new(MockTestPaymentStore::new()));

        let result = service.enroll(command()).await;
        assert!(matches!(result, Err(CourseError::AlreadyEnrolled)));
    }

    #[tokio::test]
    async fn test_unpublished_course_not_found() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_find_published_by_id()
            .returning(|_| Ok(None));
        repository.expect_find_active_enrollment().never();

        let service = CourseService::new(Arc::new(repository), Arc::new(MockTestPaymentStore::new()));

        let result = service.enroll(command()).await;
        assert!(matches!(result, Err(CourseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_payment_store_outage_is_unavailable() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_find_published_by_id()
            .returning(|id| Ok(Some(course(id.as_i32(), false))));
        repository
            .expect_find_active_enrollment()
            .returning(|_, _| Ok(None));

        let mut payments = MockTestPaymentStore::new();
        payments
            .expect_has_paid()
            .returning(|_, _, _| Err(PaymentError::Unavailable("pool timed out".to_string())));

        let service = CourseService::new(Arc::new(repository), Arc::new(payments));

        let result = service.enroll(command()).await;
        assert!(matches!(result, Err(CourseError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_list_courses_wraps_page() {
        let mut repository = MockTestCourseRepository::new();
        repository
            .expect_list_published()
            .withf(|filter, pagination| filter.free_only && pagination.page() == 2)
            .returning(|_, _| Ok((vec![course(1, true)], 13)));

        let service = CourseService::new(Arc::new(repository), Arc::new(MockTestPaymentStore::new()));

        let filter = CourseFilter {
            free_only: true,
            ..CourseFilter::default()
        };
        let page = service
            .list_courses(filter, Pagination::new(Some(2), None))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 13);
        assert_eq!(page.total_pages(), 2);
    }
}
