use anyhow::Context;

use chatorder_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatorder_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.api_secret_is_default {
        tracing::warn!("API_SECRET not set; using insecure dev default");
    }
    if config.data_api_url.is_none() {
        tracing::warn!("DATA_API_URL not set; requests without dataApi use the in-memory store");
    }

    let app = chatorder_api::app::build_app(&config).context("failed to build app")?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
