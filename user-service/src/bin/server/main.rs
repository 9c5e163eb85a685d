use std::sync::Arc;

use auth::AuthService;
use auth::PasswordHasher;
use auth::TokenCodec;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::user::credentials::UserCredentials;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;
use user_service::user::ports::UserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        persistence = if config.database.is_some() { "postgresql" } else { "memory" },
        jwt_algorithm = %config.jwt.algorithm,
        token_ttl_minutes = config.jwt.expiration_minutes,
        cors_origins = ?config.cors.allowed_origins,
        "Configuration loaded"
    );

    match config.database.clone() {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            serve(Arc::new(PostgresUserRepository::new(pg_pool)), &config).await
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory and lost on restart");
            serve(Arc::new(InMemoryUserRepository::new()), &config).await
        }
    }
}

async fn serve<UR>(user_repository: Arc<UR>, config: &Config) -> Result<(), anyhow::Error>
where
    UR: UserRepository,
{
    let password_hasher = PasswordHasher::with_params(config.password)?;
    let token_codec =
        TokenCodec::with_algorithm(config.jwt.secret.as_bytes(), config.jwt.algorithm()?)?;

    let auth_service = Arc::new(
        AuthService::new(
            Arc::new(UserCredentials::new(Arc::clone(&user_repository))),
            token_codec,
            config.jwt.ttl()?,
        )?
        .with_password_hasher(password_hasher),
    );
    let user_service = Arc::new(UserService::new(
        user_repository,
        auth_service.password_hasher().clone(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, auth_service, &config.cors);

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
