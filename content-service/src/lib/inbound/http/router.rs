use std::sync::Arc;
use std::time::Duration;

use auth_core::TokenHandler;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_lesson::create_lesson;
use super::handlers::list_catalog::list_catalog;
use super::handlers::list_lessons::list_lessons;
use super::middleware::authenticate;
use super::middleware::require_admin;
use super::middleware::require_subscriber;
use crate::domain::lesson::service::LessonService;
use crate::outbound::repositories::PostgresLessonRepository;
use crate::outbound::repositories::PostgresSubscriptionProbe;

#[derive(Clone)]
pub struct AppState {
    pub lesson_service: Arc<LessonService<PostgresLessonRepository>>,
    /// Gate probe for subscription re-fetch against the credential store.
    pub subscriptions: Arc<PostgresSubscriptionProbe>,
    pub tokens: Arc<TokenHandler>,
}

pub fn create_router(
    lesson_service: Arc<LessonService<PostgresLessonRepository>>,
    subscriptions: Arc<PostgresSubscriptionProbe>,
    tokens: Arc<TokenHandler>,
) -> Router {
    let state = AppState {
        lesson_service,
        subscriptions,
        tokens,
    };

    let public_routes = Router::new().route("/api/catalog", get(list_catalog));

    let subscriber_routes = Router::new()
        .route("/api/lessons", get(list_lessons))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_subscriber,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin_routes = Router::new()
        .route("/api/lessons", post(create_lesson))
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
        .merge(subscriber_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
