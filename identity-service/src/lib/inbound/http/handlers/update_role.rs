use std::str::FromStr;

use auth_core::Role;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::AccountId;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn update_role(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let account_id = AccountId::from_string(&account_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let role =
        Role::from_str(&body.role).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .account_service
        .update_role(&account_id, role)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateRoleRequest {
    role: String,
}
