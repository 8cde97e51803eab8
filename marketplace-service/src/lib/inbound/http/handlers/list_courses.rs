use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::PaginationData;
use crate::domain::course::models::Category;
use crate::domain::course::models::Course;
use crate::domain::course::models::CourseFilter;
use crate::domain::course::models::CourseLevel;
use crate::domain::course::models::Instructor;
use crate::domain::course::models::Pagination;
use crate::inbound::http::router::AppState;

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<ApiSuccess<Vec<CourseData>>, ApiError> {
    let (filter, pagination) = query.into_filter();

    let page = state
        .course_service
        .list_courses(filter, pagination)
        .await
        .map_err(ApiError::from)?;

    let meta = PaginationData {
        page: page.pagination.page(),
        limit: page.pagination.limit(),
        total: page.total,
        total_pages: page.total_pages(),
    };

    Ok(ApiSuccess::paginated(
        StatusCode::OK,
        page.items.iter().map(CourseData::from).collect(),
        meta,
    ))
}

/// Raw catalog query string.
///
/// Every field is text so that a malformed value falls back to "no filter"
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListCoursesQuery {
    page: Option<String>,
    limit: Option<String>,
    category: Option<String>,
    level: Option<String>,
    search: Option<String>,
    featured: Option<String>,
    free: Option<String>,
}

impl ListCoursesQuery {
    fn into_filter(self) -> (CourseFilter, Pagination) {
        let number = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());

        let pagination = Pagination::new(number(&self.page), number(&self.limit));
        let filter = CourseFilter {
            category_id: self
                .category
                .as_deref()
                .and_then(|s| s.trim().parse::<i32>().ok()),
            level: self
                .level
                .as_deref()
                .and_then(|s| s.trim().parse::<CourseLevel>().ok()),
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            featured_only: self.featured.as_deref() == Some("true"),
            free_only: self.free.as_deref() == Some("true"),
        };

        (filter, pagination)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorData {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&Instructor> for InstructorData {
    fn from(instructor: &Instructor) -> Self {
        Self {
            id: instructor.id.as_i32(),
            name: instructor.name.clone(),
            avatar_url: instructor.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryData {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryData {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub level: &'static str,
    pub status: &'static str,
    pub duration: i32,
    pub language: String,
    pub is_free: bool,
    pub is_featured: bool,
    pub enrollment_count: i32,
    pub rating: f64,
    pub review_count: i32,
    pub instructor: Option<InstructorData>,
    pub category: Option<CategoryData>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&Course> for CourseData {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.as_i32(),
            title: course.title.clone(),
            slug: course.slug.clone(),
            description: course.description.clone(),
            short_description: course.short_description.clone(),
            thumbnail_url: course.thumbnail_url.clone(),
            price: course.price,
            original_price: course.original_price,
            level: course.level.as_str(),
            status: course.status.as_str(),
            duration: course.duration_minutes,
            language: course.language.clone(),
            is_free: course.is_free,
            is_featured: course.is_featured,
            enrollment_count: course.enrollment_count,
            rating: course.rating.value(),
            review_count: course.review_count,
            instructor: course.instructor.as_ref().map(InstructorData::from),
            category: course.category.as_ref().map(CategoryData::from),
            created_at: course.created_at,
            published_at: course.published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let (filter, pagination) = ListCoursesQuery::default().into_filter();
        assert_eq!(filter, CourseFilter::default());
        assert_eq!((pagination.page(), pagination.limit()), (1, 12));
    }

    #[test]
    fn test_malformed_values_do_not_filter() {
        let query = ListCoursesQuery {
            page: Some("two".to_string()),
            limit: Some("500".to_string()),
            category: Some("web".to_string()),
            level: Some("expert".to_string()),
            search: Some("   ".to_string()),
            featured: Some("yes".to_string()),
            free: Some("true".to_string()),
        };
        let (filter, pagination) = query.into_filter();

        assert_eq!(filter.category_id, None);
        assert_eq!(filter.level, None);
        assert_eq!(filter.search, None);
        assert!(!filter.featured_only);
        assert!(filter.free_only);
        assert_eq!((pagination.page(), pagination.limit()), (1, 100));
    }

    #[test]
    fn test_known_level_and_category_filter() {
        let query = ListCoursesQuery {
            category: Some("4".to_string()),
            level: Some("advanced".to_string()),
            search: Some(" tokio ".to_string()),
            ..ListCoursesQuery::default()
        };
        let (filter, _) = query.into_filter();

        assert_eq!(filter.category_id, Some(4));
        assert_eq!(filter.level, Some(CourseLevel::Advanced));
        assert_eq!(filter.search.as_deref(), Some("tokio"));
    }
}
