use std::sync::Arc;

use tracing::instrument;

use crate::bein_scraper;
use crate::config::ScraperConfig;
use crate::error::{BeinError, Result};
use crate::model::*;

/// The main entry point for scraping beIN Sports.
///
/// `BeinClient` wraps two [`reqwest::Client`]s (one for pages, one that
/// never follows redirects for CDN resolution) and the site configuration.
/// It is cheap to clone and holds no per-request state.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> bein_highlights::Result<()> {
/// use bein_highlights::{BeinClient, ScraperConfig, WeekSelector};
///
/// let client = BeinClient::new(ScraperConfig::default())?;
/// let fixture = client.get_fixture(WeekSelector::Current).await?;
/// println!("Week {} has {} matches", fixture.week, fixture.matches.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BeinClient {
    http: reqwest::Client,
    resolver: reqwest::Client,
    config: Arc<ScraperConfig>,
}

impl BeinClient {
    /// Create a client with default HTTP settings.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let resolver = bein_scraper::redirect::resolver_client().map_err(BeinError::ClientBuild)?;
        Ok(Self::with_clients(reqwest::Client::new(), resolver, config))
    }

    /// Create a client from preconfigured [`reqwest::Client`]s.
    ///
    /// `resolver` must have redirect following disabled.
    pub fn with_clients(
        http: reqwest::Client,
        resolver: reqwest::Client,
        config: ScraperConfig,
    ) -> Self {
        Self {
            http,
            resolver,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// The round currently active on the site, or the configured fallback.
    #[instrument(skip(self))]
    pub async fn detect_current_week(&self) -> u32 {
        bein_scraper::current_week::detect_current_week(&self.http, &self.config).await
    }

    /// Fetch and normalize every match of a round.
    #[instrument(skip(self))]
    pub async fn get_fixture(&self, week: WeekSelector) -> Result<FixtureWeek> {
        bein_scraper::fixture::get_fixture(&self.http, &self.config, week).await
    }

    /// Find the highlight video on a match page and resolve it to a playable URL.
    #[instrument(skip(self))]
    pub async fn scrape_video(&self, page_url: &str) -> Result<VideoExtraction> {
        bein_scraper::video::scrape_video(&self.http, &self.resolver, &self.config, page_url).await
    }
}
