//! Todo Server - JSON-over-HTTP todo API partitioned by authenticated user
//!
//! Endpoints:
//! - GET    /todos       - list the user's todos
//! - POST   /todos       - create a todo
//! - PUT    /todos/{id}  - update a todo
//! - DELETE /todos/{id}  - delete a todo
//! - GET    /health      - liveness check (no auth)
//!
//! Every protected route verifies its bearer token with the external
//! authentication authority before touching storage.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_server::store::{KvStore, MemoryKvStore, PostgresKvStore};
use todo_server::{create_router, AppState, AuthClient, Config, CorsPolicy, TodoRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "todo_server=info,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let store: Arc<dyn KvStore> = match &config.database_url {
        Some(database_url) => {
            let store = PostgresKvStore::new(database_url).await?;
            store.migrate().await?;
            store.check_health().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using in-memory storage, todos will be lost on restart");
            Arc::new(MemoryKvStore::new())
        }
    };

    let state = AppState {
        auth: Arc::new(AuthClient::new(config.auth_service_url.clone())),
        repo: TodoRepository::new(store),
        cors: CorsPolicy::new(
            config.cors_base_domain.clone(),
            config.cors_fallback_origin.clone(),
        ),
    };

    let app = create_router(state, config.body_limit_mb);

    let addr = config.socket_addr();
    info!(auth_service_url = %config.auth_service_url, "listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
