use auth_core::GateError;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::account::errors::AccountError;
use crate::account::models::Account;

pub mod change_password;
pub mod forgot_password;
pub mod get_profile;
pub mod login;
pub mod logout;
pub mod register;
pub mod reset_password;
pub mod update_profile;
pub mod update_role;
pub mod update_subscription;

/// Cookie carrying the session token, HttpOnly so scripts never see it.
pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }

    /// Render the success response with a `Set-Cookie` header attached.
    pub fn with_cookie(self, cookie: HeaderValue) -> Response {
        let mut response = self.into_response();
        response.headers_mut().insert(header::SET_COOKIE, cookie);
        response
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: &str, max_age_secs: i64) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}"
    ))
    .map_err(|e| ApiError::InternalServerError(e.to_string()))
}

/// Cookie that immediately expires the session cookie.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    ServiceUnavailable(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            // Uniform refusal; does not say which part of the credential failed.
            AccountError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AccountError::InvalidOrExpiredToken => {
                ApiError::BadRequest("Token is invalid or expired".to_string())
            }
            AccountError::InvalidAccountId(_)
            | AccountError::InvalidFullName(_)
            | AccountError::InvalidEmail(_) => ApiError::UnprocessableEntity(err.to_string()),
            // Must never reach a response; handlers collapse it before this
            // point. If it does, stay generic.
            AccountError::UnknownIdentity => {
                ApiError::InternalServerError("Request could not be processed".to_string())
            }
            AccountError::Password(_) | AccountError::Notification(_) => {
                ApiError::InternalServerError(err.to_string())
            }
            // Infrastructure fault, retryable: not an authorization decision.
            AccountError::Database(_) => {
                ApiError::ServiceUnavailable("Service temporarily unavailable".to_string())
            }
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            // Same shape for role and subscription refusals; the reason is
            // logged, not returned.
            GateError::Forbidden(_) => ApiError::Forbidden(
                "You do not have permission to access this resource".to_string(),
            ),
            GateError::Store(e) => ApiError::ServiceUnavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Externally visible account shape. Password hashes and reset material are
/// not representable here by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub subscription_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            full_name: account.full_name.as_str().to_string(),
            role: account.role.as_str().to_string(),
            subscription_status: account.subscription.as_str().to_string(),
            created_at: account.created_at,
        }
    }
}
