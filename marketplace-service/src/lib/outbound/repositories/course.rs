use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use super::is_foreign_key_violation;
use super::is_unavailable;
use super::is_unique_violation;
use crate::course::errors::CourseError;
use crate::domain::course::models::Category;
use crate::domain::course::models::Course;
use crate::domain::course::models::CourseDetail;
use crate::domain::course::models::CourseFilter;
use crate::domain::course::models::CourseId;
use crate::domain::course::models::CourseLesson;
use crate::domain::course::models::CourseLevel;
use crate::domain::course::models::CourseModule;
use crate::domain::course::models::CourseStatus;
use crate::domain::course::models::Enrollment;
use crate::domain::course::models::EnrollmentStatus;
use crate::domain::course::models::Instructor;
use crate::domain::course::models::Pagination;
use crate::domain::course::ports::CourseRepository;
use crate::domain::user::models::Rating;
use crate::domain::user::models::UserId;

const COURSE_SELECT: &str = r#"
    SELECT
        c.id,
        c.title,
        c.slug,
        c.description,
        c.short_description,
        c.thumbnail_url,
        c.price,
        c.original_price,
        c.level,
        c.status,
        c.duration,
        c.language,
        c.is_free,
        c.is_featured,
        c.enrollment_count,
        c.rating::TEXT AS rating,
        c.review_count,
        c.created_at,
        c.published_at,
        i.id AS instructor_id,
        i.name AS instructor_name,
        i.avatar_url AS instructor_avatar_url,
        cat.id AS category_id,
        cat.name AS category_name,
        cat.slug AS category_slug
    FROM courses c
    LEFT JOIN users i ON i.id = c.instructor_id
    LEFT JOIN course_categories cat ON cat.id = c.category_id
"#;

// $1 category, $2 level, $3 search pattern, $4 featured only, $5 free only
const CATALOG_FILTER: &str = r#"
    WHERE c.status = 'published'
      AND ($1::INT IS NULL OR c.category_id = $1)
      AND ($2::TEXT IS NULL OR c.level = $2)
      AND ($3::TEXT IS NULL OR c.title ILIKE $3 OR c.description ILIKE $3)
      AND (NOT $4 OR c.is_featured)
      AND (NOT $5 OR c.is_free)
"#;

const ENROLLMENT_COLUMNS: &str =
    "id, course_id, student_id, status, progress::TEXT AS progress, enrolled_at";

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: i32,
    title: String,
    slug: String,
    description: Option<String>,
    short_description: Option<String>,
    thumbnail_url: Option<String>,
    price: i64,
    original_price: Option<i64>,
    level: String,
    status: String,
    duration: i32,
    language: String,
    is_free: bool,
    is_featured: bool,
    enrollment_count: i32,
    rating: Option<String>,
    review_count: i32,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    instructor_id: Option<i32>,
    instructor_name: Option<String>,
    instructor_avatar_url: Option<String>,
    category_id: Option<i32>,
    category_name: Option<String>,
    category_slug: Option<String>,
}

impl CourseRow {
    fn into_course(self) -> Result<Course, CourseError> {
        let level = self
            .level
            .parse::<CourseLevel>()
            .map_err(CourseError::DatabaseError)?;
        let status = self
            .status
            .parse::<CourseStatus>()
            .map_err(CourseError::DatabaseError)?;

        let instructor = match (self.instructor_id, self.instructor_name) {
            (Some(id), Some(name)) => Some(Instructor {
                id: UserId(id),
                name,
                avatar_url: self.instructor_avatar_url,
            }),
            _ => None,
        };

        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };

        Ok(Course {
            id: CourseId(self.id),
            title: self.title,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            thumbnail_url: self.thumbnail_url,
            price: self.price,
            original_price: self.original_price,
            level,
            status,
            duration_minutes: self.duration,
            language: self.language,
            is_free: self.is_free,
            is_featured: self.is_featured,
            enrollment_count: self.enrollment_count,
            rating: Rating::from_decimal_text(self.rating.as_deref()),
            review_count: self.review_count,
            instructor,
            category,
            created_at: self.created_at,
            published_at: self.published_at,
        })
    }
}

/// One module joined with at most one of its lessons.
#[derive(Debug, sqlx::FromRow)]
struct SyllabusRow {
    module_id: i32,
    module_title: String,
    module_description: Option<String>,
    module_order: i32,
    module_duration: i32,
    lesson_id: Option<i32>,
    lesson_title: Option<String>,
    lesson_description: Option<String>,
    lesson_type: Option<String>,
    lesson_duration: Option<i32>,
    lesson_order: Option<i32>,
    lesson_is_preview: Option<bool>,
}

/// Fold ordered module/lesson rows into modules, preserving row order.
fn group_syllabus(rows: Vec<SyllabusRow>) -> Vec<CourseModule> {
    let mut modules: Vec<CourseModule> = Vec::new();

    for row in rows {
        let lesson = match (row.lesson_id, row.lesson_title) {
            (Some(id), Some(title)) => Some(CourseLesson {
                id,
                title,
                description: row.lesson_description,
                lesson_type: row.lesson_type.unwrap_or_else(|| "video".to_string()),
                duration_minutes: row.lesson_duration.unwrap_or(0),
                order: row.lesson_order.unwrap_or(0),
                is_preview: row.lesson_is_preview.unwrap_or(false),
            }),
            _ => None,
        };

        match modules.last_mut() {
            Some(current) if current.id == row.module_id => {
                current.lessons.extend(lesson);
            }
            _ => modules.push(CourseModule {
                id: row.module_id,
                title: row.module_title,
                description: row.module_description,
                order: row.module_order,
                duration_minutes: row.module_duration,
                lessons: lesson.into_iter().collect(),
            }),
        }
    }

    modules
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: i32,
    course_id: i32,
    student_id: i32,
    status: String,
    progress: Option<String>,
    enrolled_at: DateTime<Utc>,
}

impl EnrollmentRow {
    fn into_enrollment(self) -> Result<Enrollment, CourseError> {
        let status = self
            .status
            .parse::<EnrollmentStatus>()
            .map_err(CourseError::DatabaseError)?;
        let progress = self
            .progress
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(Enrollment {
            id: self.id,
            course_id: CourseId(self.course_id),
            student_id: UserId(self.student_id),
            status,
            progress,
            enrolled_at: self.enrolled_at,
        })
    }
}

fn store_error(err: sqlx::Error) -> CourseError {
    tracing::error!(error = %err, "Course query failed");
    if is_unavailable(&err) {
        CourseError::Unavailable(err.to_string())
    } else {
        CourseError::DatabaseError(err.to_string())
    }
}

/// `%term%` with LIKE metacharacters in `term` escaped.
fn search_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL implementation of CourseRepository.
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn list_published(
        &self,
        filter: &CourseFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Course>, i64), CourseError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(search_pattern);
        let level = filter.level.map(|l| l.as_str());

        let list_sql =
            format!("{COURSE_SELECT} {CATALOG_FILTER} ORDER BY c.created_at DESC LIMIT $6 OFFSET $7");
        let rows = sqlx::query_as::<_, CourseRow>(&list_sql)
            .bind(filter.category_id)
            .bind(level)
            .bind(search.as_deref())
            .bind(filter.featured_only)
            .bind(filter.free_only)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM courses c {CATALOG_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.category_id)
            .bind(level)
            .bind(search.as_deref())
            .bind(filter.featured_only)
            .bind(filter.free_only)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        let courses = rows
            .into_iter()
            .map(CourseRow::into_course)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((courses, total))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<CourseDetail>, CourseError> {
        let sql = format!("{COURSE_SELECT} WHERE c.slug = $1 AND c.status = 'published'");

        let Some(row) = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };
        let course = row.into_course()?;

        let syllabus = sqlx::query_as::<_, SyllabusRow>(
            r#"
            SELECT
                m.id AS module_id,
                m.title AS module_title,
                m.description AS module_description,
                m.sort_order AS module_order,
                m.duration AS module_duration,
                l.id AS lesson_id,
                l.title AS lesson_title,
                l.description AS lesson_description,
                l.lesson_type AS lesson_type,
                l.duration AS lesson_duration,
                l.sort_order AS lesson_order,
                l.is_preview AS lesson_is_preview
            FROM course_modules m
            LEFT JOIN course_lessons l ON l.module_id = m.id
            WHERE m.course_id = $1
            ORDER BY m.sort_order, m.id, l.sort_order, l.id
            "#,
        )
        .bind(course.id.as_i32())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(Some(CourseDetail {
            course,
            modules: group_syllabus(syllabus),
        }))
    }

    async fn find_published_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseError> {
        let sql = format!("{COURSE_SELECT} WHERE c.id = $1 AND c.status = 'published'");

        let row = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(CourseRow::into_course).transpose()
    }

    async fn find_active_enrollment(
        &self,
        course_id: CourseId,
        student_id: UserId,
    ) -> Result<Option<Enrollment>, CourseError> {
        let sql = format!(
            r#"
            SELECT {ENROLLMENT_COLUMNS}
            FROM course_enrollments
            WHERE course_id = $1 AND student_id = $2 AND status = 'active'
            "#
        );

        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(course_id.as_i32())
            .bind(student_id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(EnrollmentRow::into_enrollment).transpose()
    }

    async fn create_enrollment(
        &self,
        course_id: CourseId,
        student_id: UserId,
    ) -> Result<Enrollment, CourseError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let sql = format!(
            r#"
            INSERT INTO course_enrollments (course_id, student_id, status, progress)
            VALUES ($1, $2, 'active', 0)
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(course_id.as_i32())
            .bind(student_id.as_i32())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return CourseError::AlreadyEnrolled;
                }
                if is_foreign_key_violation(&e) {
                    return CourseError::StudentNotFound(student_id.to_string());
                }
                store_error(e)
            })?;

        sqlx::query("UPDATE courses SET enrollment_count = enrollment_count + 1 WHERE id = $1")
            .bind(course_id.as_i32())
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        row.into_enrollment()
    }
}
