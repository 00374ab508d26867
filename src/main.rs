use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transfer_booking_backend::{
    config::{Config, StoreBackend},
    db,
    middleware::request_log::log_request,
    routes,
    seed::{seed_all, SeedOutcome},
    store::{DocumentStore, MemoryStore, PgDocumentStore},
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transfer_booking_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    tracing::info!(backend = ?config.store_backend, "Starting server at {}", config.server_addr());

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let db = db::connect(&config)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Connected to database");

            migration::Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
            tracing::info!("Migrations complete");

            Arc::new(PgDocumentStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed_on_startup {
        let report = seed_all(store.as_ref()).await;
        let failed = report
            .iter()
            .filter(|(_, outcome)| *outcome == SeedOutcome::Failed)
            .count();
        tracing::info!(steps = report.len(), failed, "Seeding finished");
    }

    let state = AppState {
        store,
        config: config.clone(),
    };

    // 100 requests burst per IP, one token per second after that
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(1)
            .burst_size(100)
            .finish()
            .expect("Invalid rate limit configuration"),
    );

    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(GovernorLayer::new(governor_config));

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
