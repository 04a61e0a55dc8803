//! Server: reads settings from the environment, creates the tables, loads the
//! seed fixture when configured and serves the API.

use marketplace_api::{apply_migrations, app, connect, load_seed_file, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("marketplace_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = connect(&settings.database_url, settings.max_connections).await?;
    apply_migrations(&pool).await?;

    match &settings.seed_path {
        Some(path) => {
            load_seed_file(&pool, path).await?;
        }
        None => tracing::info!("SEED_PATH is empty, starting without seed data"),
    }

    let state = AppState { pool };
    let app = app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
