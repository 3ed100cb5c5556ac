use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::LessonSummaryData;
use crate::inbound::http::router::AppState;
use crate::lesson::ports::LessonServicePort;

/// Public catalog: lesson titles only, no authentication required.
pub async fn list_catalog(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<LessonSummaryData>>, ApiError> {
    let summaries = state.lesson_service.catalog().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        summaries.iter().map(LessonSummaryData::from).collect(),
    ))
}
