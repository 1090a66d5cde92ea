use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use agendabot::catalog::Catalog;
use agendabot::config::AppConfig;
use agendabot::db;
use agendabot::handlers;
use agendabot::services::messaging::whatsapp::WhatsAppProvider;
use agendabot::state::AppState;
use agendabot::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    anyhow::ensure!(
        !config.verify_token.is_empty(),
        "VERIFY_TOKEN must be set for the webhook handshake"
    );

    let conn = db::init_db(&config.database_url)?;
    let catalog = Arc::new(Catalog::default());
    let store = Arc::new(SqliteStore::new(
        Arc::new(Mutex::new(conn)),
        Arc::clone(&catalog),
    ));

    let messaging = WhatsAppProvider::new(
        config.whatsapp_api_url.clone(),
        config.whatsapp_token.clone(),
        config.phone_number_id.clone(),
    );

    let state = Arc::new(AppState {
        store,
        catalog,
        config: config.clone(),
        messaging: Box::new(messaging),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/webhook",
            get(handlers::webhook::verify_webhook).post(handlers::webhook::receive_webhook),
        )
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/cancel",
            post(handlers::admin::cancel_booking),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
