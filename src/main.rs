use anyhow::Context;
use bein_highlights::{server, BeinClient, ScraperConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let scraper_config = ScraperConfig::from_env();
    tracing::info!(
        base_url = %scraper_config.base_url,
        season = %scraper_config.season,
        fallback_week = scraper_config.fallback_week,
        "scraper configured"
    );
    let client = BeinClient::new(scraper_config).context("building http clients")?;

    let server_config = ServerConfig::from_env();
    let addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!("listening on {addr}");
    axum::serve(listener, server::router(client))
        .await
        .context("serving http")?;
    Ok(())
}
