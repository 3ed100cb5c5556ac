use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::LessonData;
use crate::inbound::http::router::AppState;
use crate::lesson::ports::LessonServicePort;

pub async fn list_lessons(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<LessonData>>, ApiError> {
    let lessons = state.lesson_service.list_lessons().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        lessons.iter().map(LessonData::from).collect(),
    ))
}
