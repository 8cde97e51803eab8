use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use marketplace_service::config::Config;
use marketplace_service::config::PaymentStoreKind;
use marketplace_service::domain::auth::service::AuthService;
use marketplace_service::domain::clock::SystemClock;
use marketplace_service::domain::course::service::CourseService;
use marketplace_service::domain::payment::ports::PaymentStore;
use marketplace_service::domain::payment::qris::MerchantProfile;
use marketplace_service::domain::payment::service::PaymentService;
use marketplace_service::domain::payment::service::PaymentSettings;
use marketplace_service::domain::payment::webhook::WebhookVerifier;
use marketplace_service::domain::project::service::ProjectService;
use marketplace_service::domain::user::service::UserService;
use marketplace_service::inbound::http::router::create_router;
use marketplace_service::inbound::http::router::AppState;
use marketplace_service::inbound::sweeper::spawn_payment_sweeper;
use marketplace_service::outbound::events::KafkaEventProducer;
use marketplace_service::outbound::repositories::InMemoryPaymentStore;
use marketplace_service::outbound::repositories::PostgresCourseRepository;
use marketplace_service::outbound::repositories::PostgresPaymentStore;
use marketplace_service::outbound::repositories::PostgresProjectRepository;
use marketplace_service::outbound::repositories::PostgresPurposeCatalog;
use marketplace_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "marketplace-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    config.validate()?;

    tracing::info!(
        http_port = config.server.http_port,
        kafka_brokers = %config.kafka.brokers,
        kafka_topic = %config.kafka.topic,
        payment_store = ?config.payments.store,
        simulation_enabled = config.payments.simulation_enabled,
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

    let password_hasher = PasswordHasher::with_iterations(config.password.iterations)?;
    let authenticator = Arc::new(Authenticator::with_password_hasher(
        config.jwt.secret.as_bytes(),
        password_hasher.clone(),
    )?);

    let state = match config.payments.store {
        PaymentStoreKind::Postgres => build_state(
            &config,
            pg_pool.clone(),
            Arc::new(PostgresPaymentStore::new(pg_pool)),
            password_hasher,
            authenticator,
        )?,
        PaymentStoreKind::Memory => {
            tracing::warn!("Payments are kept in memory and lost on restart");
            build_state(
                &config,
                pg_pool,
                Arc::new(InMemoryPaymentStore::new()),
                password_hasher,
                authenticator,
            )?
        }
    };

    let shutdown = CancellationToken::new();
    let sweeper = spawn_payment_sweeper(
        Arc::clone(&state.payment_service),
        Duration::from_secs(config.payments.sweep_interval_secs),
        shutdown.clone(),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state, config.payments.simulation_enabled);
    let server_shutdown = shutdown.clone();
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!(error = %e, "Sweeper task ended abnormally");
    }

    tracing::info!("Server exited");

    Ok(())
}

/// Wire every service over the chosen payment store.
fn build_state<PS: PaymentStore>(
    config: &Config,
    pg_pool: PgPool,
    payment_store: Arc<PS>,
    password_hasher: PasswordHasher,
    authenticator: Arc<Authenticator>,
) -> Result<AppState, anyhow::Error> {
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let project_repository = Arc::new(PostgresProjectRepository::new(pg_pool.clone()));
    let course_repository = Arc::new(PostgresCourseRepository::new(pg_pool.clone()));
    let purpose_catalog = Arc::new(PostgresPurposeCatalog::new(pg_pool));
    let event_producer = Arc::new(KafkaEventProducer::new(&config.kafka)?);

    let settings = PaymentSettings {
        merchant: MerchantProfile {
            merchant_id: config.payments.merchant_id.clone(),
            merchant_name: config.payments.merchant_name.clone(),
        },
        expiry: chrono::Duration::minutes(config.payments.expiry_minutes),
        minimum_amount: config.payments.minimum_amount,
    };
    let verifier = WebhookVerifier::new(config.payments.webhook_secret.as_bytes())?;

    Ok(AppState {
        auth_service: Arc::new(AuthService::new(
            Arc::clone(&user_repository),
            authenticator,
            chrono::Duration::days(config.jwt.expiration_days),
        )?),
        user_service: Arc::new(UserService::new(user_repository, password_hasher)),
        project_service: Arc::new(ProjectService::new(project_repository)),
        course_service: Arc::new(CourseService::new(
            course_repository,
            Arc::clone(&payment_store),
        )),
        payment_service: Arc::new(PaymentService::new(
            payment_store,
            purpose_catalog,
            event_producer,
            Arc::new(SystemClock),
            verifier,
            settings,
        )),
    })
}
