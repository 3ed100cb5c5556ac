use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::session_cookie;
use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::EmailAddress;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    // A malformed email cannot match any account; same refusal as a wrong
    // password.
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let account = state
        .account_service
        .authenticate(&email, &body.password)
        .await?;

    let token = state
        .tokens
        .issue(account.id.to_string(), account.role, account.subscription)
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
    let cookie = session_cookie(&token, state.session_ttl.num_seconds())?;

    let success = ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            account: (&account).into(),
            token,
        },
    );

    Ok(success.with_cookie(cookie))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub account: AccountData,
    pub token: String,
}
