use ::scraper::Html;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::bein_scraper::{self, parse_next_data};
use crate::config::ScraperConfig;
use crate::error::Result;

/// Active round according to the fixture overview page.
///
/// Never fails: any problem is logged and the configured fallback week is
/// returned so callers always have a round to show.
#[instrument(skip(client, config))]
pub(crate) async fn detect_current_week(client: &reqwest::Client, config: &ScraperConfig) -> u32 {
    let url = config.site_url(&format!("lig/{}/fikstur", config.league));
    let body = match bein_scraper::get_page(client, config, &url, None, config.current_week_timeout)
        .await
    {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, fallback = config.fallback_week, "current week detection failed");
            return config.fallback_week;
        }
    };

    match parse_active_round(&body, &url) {
        Ok(Some(week)) => {
            debug!(week, "detected current week");
            week
        }
        Ok(None) => {
            warn!(url, fallback = config.fallback_week, "no active round on fixture page");
            config.fallback_week
        }
        Err(e) => {
            warn!(error = %e, fallback = config.fallback_week, "current week detection failed");
            config.fallback_week
        }
    }
}

fn parse_active_round(body: &str, url: &str) -> Result<Option<u32>> {
    let document = Html::parse_document(body);
    let data = parse_next_data(&document, url)?;
    Ok(active_round(&data))
}

fn active_round(data: &Value) -> Option<u32> {
    let round = data.pointer("/props/pageProps/orgData/activeRound/round")?;
    round
        .as_u64()
        .or_else(|| round.as_str().and_then(|s| s.trim().parse().ok()))
        .and_then(|r| u32::try_from(r).ok())
        .filter(|r| *r > 0)
}
