use aquastore::{
    AppState,
    auth::SessionStore,
    config::{AppConfig, Env},
    create_router,
    payments::{PaymentState, RazorpayClient},
    repository::{PostgresRepository, RepositoryState},
    storage::{LocalDiskStore, MediaState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point, responsible for initializing all core
/// components in order: Configuration, Logging, Database, Bootstrap Admin,
/// Media directory, and the HTTP server. Failure to reach the database is
/// fatal; nothing is served until the store is ready.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes RUST_LOG, falling back to sensible defaults for local
    // development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aquastore=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON format output for ingestion by log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Bootstrap Admin (idempotent)
    // Ensures the configured default admin exists; never deletes or
    // overwrites existing admin accounts. Skipped when no credentials are
    // configured (production without ADMIN_EMAIL/ADMIN_PASSWORD).
    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            let email = email.trim().to_lowercase();
            let hash = aquastore::auth::hash_password(password)
                .expect("FATAL: Failed to hash bootstrap admin password.");
            match repo.ensure_default_admin("Admin User", &email, &hash).await {
                Ok(()) => tracing::info!(admin = %email, "default admin ensured"),
                Err(e) => tracing::error!("admin bootstrap failed: {:?}", e),
            }
        }
        _ => {
            tracing::warn!("no admin credentials configured; skipping admin bootstrap");
        }
    }

    // 6. Media Storage Initialization (local disk, served under /uploads)
    std::fs::create_dir_all(&config.upload_dir)
        .expect("FATAL: Failed to create the upload directory.");
    let media = Arc::new(LocalDiskStore::new(&config.upload_dir)) as MediaState;

    // 7. Payment Gateway Initialization
    let payments = Arc::new(RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    )) as PaymentState;

    // 8. Unified State Assembly
    let app_state = AppState {
        repo,
        media,
        payments,
        sessions: SessionStore::default(),
        config: config.clone(),
    };

    // 9. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("FATAL: Failed to bind the listener port.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:{}", config.port);
    tracing::info!(
        "API Documentation (Swagger UI) available at: http://localhost:{}/swagger-ui",
        config.port
    );

    axum::serve(listener, app)
        .await
        .expect("FATAL: Server terminated unexpectedly.");
}
