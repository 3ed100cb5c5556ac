use std::sync::Arc;
use std::time::Duration;

use auth_core::TokenHandler;
use content_service::config::Config;
use content_service::domain::lesson::service::LessonService;
use content_service::inbound::http::router::create_router;
use content_service::outbound::repositories::PostgresLessonRepository;
use content_service::outbound::repositories::PostgresSubscriptionProbe;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "content_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "content-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    // Connection URLs and the signing key stay out of the logs.
    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_minutes = config.auth.token_ttl_minutes,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let credential_pool = PgPoolOptions::new()
        .max_connections(config.credential_store.max_connections)
        .acquire_timeout(Duration::from_secs(
            config.credential_store.acquire_timeout_secs,
        ))
        .connect(&config.credential_store.url)
        .await?;
    tracing::info!(
        max_connections = config.credential_store.max_connections,
        "Credential store connection pool created"
    );

    let session_ttl = chrono::Duration::minutes(config.auth.token_ttl_minutes);
    let tokens = Arc::new(TokenHandler::new(&config.auth.secret, session_ttl)?);

    let lesson_repository = Arc::new(PostgresLessonRepository::new(pg_pool));
    let subscriptions = Arc::new(PostgresSubscriptionProbe::new(credential_pool));
    let lesson_service = Arc::new(LessonService::new(lesson_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(lesson_service, subscriptions, tokens);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
