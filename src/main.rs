use std::sync::Arc;

use teamhub_api::config;
use teamhub_api::routes;
use teamhub_api::state::AppState;
use teamhub_api::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting TeamHub API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PgStore::connect(&url)
                .await
                .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = routes::app(AppState::new(store));

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("TeamHub API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
