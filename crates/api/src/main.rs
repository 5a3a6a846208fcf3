use anyhow::Context;

use tally_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tally_observability::init();

    let config = ApiConfig::from_env()?;
    tracing::info!(policy = ?config.policy, "settlement policy loaded");

    let app = tally_api::app::build_app(config.policy);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
