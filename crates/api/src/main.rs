use std::net::SocketAddr;

use anyhow::Context;

use adminhub_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    adminhub_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let app = adminhub_api::app::build_app(&config)
        .await
        .context("failed to build services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    // Peer addresses back the audit IP when no proxy header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;
    Ok(())
}
