use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use maidy::config::AppConfig;
use maidy::db;
use maidy::handlers;
use maidy::services::notifications::fcm::FcmPushProvider;
use maidy::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.fcm_server_key.is_empty() {
        tracing::warn!("FCM_SERVER_KEY not set, push notification sends will fail");
    }
    let notifier = FcmPushProvider::new(config.fcm_server_key.clone());

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier: Box::new(notifier),
        events_tx,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings", get(handlers::bookings::get_bookings))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/transition",
            post(handlers::bookings::transition_booking),
        )
        .route("/api/devices", post(handlers::devices::register_device))
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route("/api/events", get(handlers::events::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
