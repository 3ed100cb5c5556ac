use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::AccountId;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::middleware::CurrentSession;
use crate::inbound::http::router::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<ChangePasswordResponseData>, ApiError> {
    let account_id = AccountId::from_string(&session.0.sub)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if body.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::UnprocessableEntity(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    state
        .account_service
        .change_password(&account_id, &body.current_password, &body.new_password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ChangePasswordResponseData {
            message: "Password changed".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangePasswordResponseData {
    pub message: String,
}
