use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::session_cookie;
use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::errors::FullNameError;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::RegisterCommand;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let account = state
        .account_service
        .register(body.try_into_command()?)
        .await?;

    // Registration logs the caller in immediately.
    let token = state
        .tokens
        .issue(account.id.to_string(), account.role, account.subscription)
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
    let cookie = session_cookie(&token, state.session_ttl.num_seconds())?;

    let success = ApiSuccess::new(
        StatusCode::CREATED,
        RegisterResponseData {
            account: (&account).into(),
            token,
        },
    );

    Ok(success.with_cookie(cookie))
}

/// HTTP request body for account registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    full_name: String,
    email: String,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid name: {0}")]
    FullName(#[from] FullNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let full_name = FullName::new(self.full_name)?;
        let email = EmailAddress::new(self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ParseRegisterRequestError::PasswordTooShort);
        }

        Ok(RegisterCommand::new(full_name, email, self.password))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub account: AccountData,
    pub token: String,
}
