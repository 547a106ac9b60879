use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parfum_api::auth::GithubProvider;
use parfum_api::cli::Cli;
use parfum_api::config;
use parfum_api::database::{DatabaseManager, DocumentStore, MemoryStore, PgStore};
use parfum_api::middleware::create_session_layer;
use parfum_api::router;
use parfum_api::schema::{CLIENT_SCHEMA, PERFUME_SCHEMA, USER_SCHEMA};
use parfum_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, GITHUB_CLIENT_ID, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parfum_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.apply(config::config().clone());
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Parfum API in {:?} mode", config.environment);

    let identity = Arc::new(GithubProvider::new(&config.github));
    let bind_addr = format!("0.0.0.0:{}", config.port);

    let app = if cli.memory {
        tracing::warn!("Using in-memory stores; data is lost on shutdown");
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let sessions = create_session_layer(tower_sessions::MemoryStore::default(), &config.session);
        router::app(AppState::new(store, identity, config), sessions)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;

        let store = PgStore::new(pool.clone());
        store
            .migrate(&[&*PERFUME_SCHEMA, &*CLIENT_SCHEMA, &*USER_SCHEMA])
            .await
            .context("failed to create collections")?;

        let session_store = tower_sessions_sqlx_store::PostgresStore::new(pool);
        session_store
            .migrate()
            .await
            .context("failed to create session table")?;

        let sessions = create_session_layer(session_store, &config.session);
        router::app(AppState::new(Arc::new(store), identity, config), sessions)
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Parfum API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
