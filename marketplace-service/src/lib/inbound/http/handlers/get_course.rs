use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::list_courses::CourseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::course::models::CourseDetail;
use crate::domain::course::models::CourseLesson;
use crate::domain::course::models::CourseModule;
use crate::inbound::http::router::AppState;

pub async fn get_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiSuccess<CourseDetailData>, ApiError> {
    state
        .course_service
        .get_course(&slug)
        .await
        .map_err(ApiError::from)
        .map(|ref detail| ApiSuccess::new(StatusCode::OK, detail.into()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonData {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub lesson_type: String,
    pub duration: i32,
    pub order: i32,
    pub is_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleData {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub duration: i32,
    pub lessons: Vec<LessonData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDetailData {
    #[serde(flatten)]
    pub course: CourseData,
    pub modules: Vec<ModuleData>,
}

impl From<&CourseLesson> for LessonData {
    fn from(lesson: &CourseLesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            lesson_type: lesson.lesson_type.clone(),
            duration: lesson.duration_minutes,
            order: lesson.order,
            is_preview: lesson.is_preview,
        }
    }
}

impl From<&CourseModule> for ModuleData {
    fn from(module: &CourseModule) -> Self {
        Self {
            id: module.id,
            title: module.title.clone(),
            description: module.description.clone(),
            order: module.order,
            duration: module.duration_minutes,
            lessons: module.lessons.iter().map(LessonData::from).collect(),
        }
    }
}

impl From<&CourseDetail> for CourseDetailData {
    fn from(detail: &CourseDetail) -> Self {
        Self {
            course: (&detail.course).into(),
            modules: detail.modules.iter().map(ModuleData::from).collect(),
        }
    }
}
