use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use super::clear_session_cookie;
use super::ApiError;
use super::ApiSuccess;

/// Clears the session cookie. Issued tokens remain valid until expiry;
/// self-contained tokens have no revocation path.
pub async fn logout() -> Result<Response, ApiError> {
    let success = ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Logged out".to_string(),
        },
    );

    Ok(success.with_cookie(clear_session_cookie()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
