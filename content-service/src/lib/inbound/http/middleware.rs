use auth_core::credentials;
use auth_core::gate;
use auth_core::GateError;
use auth_core::GatePolicy;
use auth_core::Role;
use auth_core::SessionClaims;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Validated claims stored in request extensions after authentication.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionClaims);

/// Middleware that validates the inbound session token.
///
/// This service runs the full validator locally on every request, even when
/// a gateway in front of it already did. Missing and invalid credentials
/// both refuse with the same uniform body.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = credentials::token_from_headers(req.headers()) else {
        tracing::debug!("No credential supplied");
        return Err(ApiError::from(GateError::Unauthenticated).into_response());
    };

    let claims = state.tokens.validate(token).map_err(|e| {
        tracing::warn!(error = %e, "Token validation failed");
        ApiError::Unauthorized("Authentication required".to_string()).into_response()
    })?;

    req.extensions_mut().insert(CurrentSession(claims));

    Ok(next.run(req).await)
}

/// Middleware restricting a route to callers with an active subscription.
///
/// Admins pass unconditionally; everyone else gets a fresh store probe.
pub async fn require_subscriber(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let claims = req.extensions().get::<CurrentSession>().map(|s| &s.0);
    let policy = GatePolicy::authenticated().subscriber_only();

    gate::check(claims, &policy, state.subscriptions.as_ref())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Authorization refused");
            ApiError::from(e).into_response()
        })?;

    Ok(next.run(req).await)
}

/// Middleware restricting a route to ADMIN callers.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let claims = req.extensions().get::<CurrentSession>().map(|s| &s.0);
    let policy = GatePolicy::with_roles(vec![Role::Admin]);

    gate::check(claims, &policy, state.subscriptions.as_ref())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Authorization refused");
            ApiError::from(e).into_response()
        })?;

    Ok(next.run(req).await)
}
