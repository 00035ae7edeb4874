//! Roster server: reads settings, opens the configured store, serves the student API.
//!
//! Run from repo root: `cargo run -p roster-server`

use roster::{apply_migrations, app, connect, AppState, InMemoryStudentStore, PgStudentStore, Settings, StoreBackend, StudentStore};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roster=info,tower_http=info")),
        )
        .init();

    let store: Arc<dyn StudentStore> = match settings.store {
        StoreBackend::Postgres => {
            let pool = connect(&settings).await?;
            if settings.run_migrations {
                let applied = apply_migrations(&pool).await?;
                tracing::info!(count = applied.len(), "migrations up to date");
            }
            Arc::new(PgStudentStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on shutdown");
            Arc::new(InMemoryStudentStore::new())
        }
    };

    let router = app(AppState::new(store), settings.body_limit_bytes);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
