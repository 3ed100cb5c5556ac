use std::sync::Arc;
use std::time::Duration;

use auth_core::TokenHandler;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::forgot_password::forgot_password;
use super::handlers::get_profile::get_profile;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::update_profile::update_profile;
use super::handlers::update_role::update_role;
use super::handlers::update_subscription::update_subscription;
use super::middleware::authenticate;
use super::middleware::require_admin;
use crate::domain::account::service::AccountService;
use crate::outbound::notifications::KafkaResetNotifier;
use crate::outbound::repositories::PostgresAccountRepository;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService<PostgresAccountRepository, KafkaResetNotifier>>,
    /// Gate probe for subscription re-fetch; shares the store pool.
    pub subscriptions: Arc<PostgresAccountRepository>,
    pub tokens: Arc<TokenHandler>,
    pub session_ttl: chrono::Duration,
}

pub fn create_router(
    account_service: Arc<AccountService<PostgresAccountRepository, KafkaResetNotifier>>,
    subscriptions: Arc<PostgresAccountRepository>,
    tokens: Arc<TokenHandler>,
    session_ttl: chrono::Duration,
) -> Router {
    let state = AppState {
        account_service,
        subscriptions,
        tokens,
        session_ttl,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password/:token", post(reset_password));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(get_profile))
        .route("/api/auth/me", patch(update_profile))
        .route("/api/auth/change-password", post(change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin_routes = Router::new()
        .route("/api/accounts/:account_id/role", patch(update_role))
        .route(
            "/api/accounts/:account_id/subscription",
            patch(update_subscription),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Spans deliberately exclude headers: they carry bearer credentials.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
