use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::LessonData;
use crate::inbound::http::router::AppState;
use crate::lesson::models::CreateLessonCommand;
use crate::lesson::models::LessonTitle;
use crate::lesson::ports::LessonServicePort;

pub async fn create_lesson(
    State(state): State<AppState>,
    Json(body): Json<CreateLessonRequest>,
) -> Result<ApiSuccess<LessonData>, ApiError> {
    let title =
        LessonTitle::new(body.title).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let command = CreateLessonCommand::new(title, body.body);

    state
        .lesson_service
        .create_lesson(command)
        .await
        .map_err(ApiError::from)
        .map(|ref lesson| ApiSuccess::new(StatusCode::CREATED, lesson.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateLessonRequest {
    title: String,
    body: String,
}
