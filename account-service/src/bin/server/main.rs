use std::sync::Arc;

use account_service::account::models::StorageBackend;
use account_service::account::ports::AccountRepository;
use account_service::account::ports::AccountServicePort;
use account_service::account::service::AccountService;
use account_service::config::Config;
use account_service::inbound::http::router::create_router;
use account_service::media::CloudinaryUploader;
use account_service::repositories::InMemoryAccountRepository;
use account_service::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        backend = ?config.database.backend,
        refresh_policy = ?config.session.refresh_policy,
        secure_cookies = config.session.secure_cookies,
        "Configuration loaded"
    );

    let token_issuer = Arc::new(config.jwt.token_issuer()?);
    let password_hasher = config.password.password_hasher()?;
    let media_uploader = Arc::new(CloudinaryUploader::from_config(&config.media));

    let account_service: Arc<dyn AccountServicePort> = match config.database.backend {
        StorageBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(
                build_service(
                    Arc::new(PostgresAccountRepository::new(pg_pool)),
                    media_uploader,
                    &token_issuer,
                    &config,
                )
                .with_password_hasher(password_hasher),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory account store, data is lost on restart");
            Arc::new(
                build_service(
                    Arc::new(InMemoryAccountRepository::new()),
                    media_uploader,
                    &token_issuer,
                    &config,
                )
                .with_password_hasher(password_hasher),
            )
        }
    };

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
        Arc::clone(&token_issuer),
        config.session.secure_cookies,
    );
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

fn build_service<AR: AccountRepository>(
    repository: Arc<AR>,
    media_uploader: Arc<CloudinaryUploader>,
    token_issuer: &Arc<auth::TokenIssuer>,
    config: &Config,
) -> AccountService<AR, CloudinaryUploader> {
    AccountService::new(repository, media_uploader, Arc::clone(token_issuer))
        .with_refresh_policy(config.session.refresh_policy)
}
