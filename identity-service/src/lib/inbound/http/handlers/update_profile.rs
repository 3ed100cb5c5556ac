use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::AccountId;
use crate::account::models::FullName;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::middleware::CurrentSession;
use crate::inbound::http::router::AppState;

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let account_id = AccountId::from_string(&session.0.sub)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let full_name =
        FullName::new(body.full_name).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .account_service
        .update_profile(&account_id, full_name)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileRequest {
    full_name: String,
}
