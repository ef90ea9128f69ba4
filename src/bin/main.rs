use chrono::Duration;
use micro_sns::{
    api::{self, AppState},
    auth::TokenIssuer,
    config::Config,
    storage::LocalBlobStore,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "micro_sns=debug,tower_http=debug,sea_orm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let db = Database::connect(config.connect_options()).await?;
    if config.migrate {
        Migrator::up(&db, None).await?;
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let store = LocalBlobStore::new(&config.upload_dir);
    let tokens = TokenIssuer::new(
        &config.jwt_secret,
        Duration::minutes(config.access_token_expire_minutes),
    );
    let state = AppState {
        db,
        store: Arc::new(store),
        tokens,
    };

    let app = api::router(state)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(api::cors_layer(&config.cors_origins));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
