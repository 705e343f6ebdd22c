use fintrack_api::{app, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fintrack_observability::init();

    let config = Config::from_env()?;
    let app = app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
