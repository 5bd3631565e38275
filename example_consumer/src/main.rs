//! Serves the studio workflows.
//!
//! Run from repo root: `cargo run -p studio-server`

use studio_api::{app_config, common_routes, resolve, workflow_routes, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("studio_api=info,studio_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let model = resolve(&app_config(&settings.schema))?;
    tracing::info!(
        tables = model.tables.len(),
        workflows = model.workflows.len(),
        schema = %settings.schema,
        "model resolved"
    );
    let state = AppState::new(pool, model);

    let app = common_routes(state.clone()).merge(workflow_routes(state, settings.max_body_bytes)?);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
