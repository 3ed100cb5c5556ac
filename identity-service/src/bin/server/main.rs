use std::sync::Arc;
use std::time::Duration;

use auth_core::PasswordHasher;
use auth_core::TokenHandler;
use identity_service::config::Config;
use identity_service::domain::account::service::AccountService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::notifications::KafkaResetNotifier;
use identity_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    // The database URL and signing key stay out of the logs.
    tracing::info!(
        http_port = config.server.http_port,
        kafka_brokers = %config.kafka.brokers,
        kafka_topic = %config.kafka.topic,
        token_ttl_minutes = config.auth.token_ttl_minutes,
        reset_window_minutes = config.auth.reset_window_minutes,
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

    let session_ttl = chrono::Duration::minutes(config.auth.token_ttl_minutes);
    let tokens = Arc::new(TokenHandler::new(&config.auth.secret, session_ttl)?);
    let password_hasher = PasswordHasher::new(config.auth.hash_cost);

    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool));
    let reset_notifier = Arc::new(KafkaResetNotifier::new(&config)?);

    let account_service = Arc::new(AccountService::new(
        Arc::clone(&account_repository),
        reset_notifier,
        password_hasher,
        chrono::Duration::minutes(config.auth.reset_window_minutes),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        account_service,
        Arc::clone(&account_repository),
        tokens,
        session_ttl,
    );
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
