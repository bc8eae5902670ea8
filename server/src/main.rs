use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use parking_server::config::{Config, StorageBackend};
use parking_server::routes::create_routes;
use parking_server::services::SystemClock;
use parking_server::state::AppState;
use parking_server::storage::{InMemoryTicketStore, PgTicketStore, TicketStore};

const DEFAULT_LOG_FILTER: &str = "parking_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let store: Arc<dyn TicketStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations run successfully");

            Arc::new(PgTicketStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; tickets are lost on restart");
            Arc::new(InMemoryTicketStore::new())
        }
    };

    let settings = store
        .ensure_garage_settings(&config.garage)
        .await
        .expect("Failed to load garage settings");
    tracing::info!(
        total_spaces = settings.total_spaces,
        hourly_rate_cents = settings.hourly_rate_cents,
        "Garage settings loaded"
    );

    let app = create_routes(AppState::new(store, Arc::new(SystemClock)), &config);

    let addr = config.socket_addr();
    tracing::info!("Parking server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
