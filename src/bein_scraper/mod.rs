pub(crate) mod current_week;
pub(crate) mod fixture;
pub(crate) mod redirect;
pub(crate) mod video;

use std::time::Duration;

use ::scraper::{ElementRef, Html, Selector};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{BeinError, Result};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_TR: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// Fetch a page the way a desktop browser would and return its body.
///
/// The site serves different markup to clients that do not look like a
/// browser, so the user agent is always sent. `referer` is added for
/// detail pages.
pub(crate) async fn get_page(
    client: &reqwest::Client,
    config: &ScraperConfig,
    url: &str,
    referer: Option<&str>,
    timeout: Duration,
) -> Result<String> {
    debug!(url, "fetching page");

    let mut request = client
        .get(url)
        .timeout(timeout)
        .header(USER_AGENT, config.user_agent.as_str())
        .header(ACCEPT, ACCEPT_HTML)
        .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_TR);
    if let Some(referer) = referer {
        request = request.header(REFERER, referer);
    }

    let response = request.send().await.map_err(|e| BeinError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BeinError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    response.text().await.map_err(|e| BeinError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })
}

/// Raw text of the `script#__NEXT_DATA__` element, if the page has one.
pub(crate) fn next_data_text(document: &Html) -> Result<Option<String>> {
    let selector = Selector::parse("script#__NEXT_DATA__")?;
    Ok(document
        .select(&selector)
        .next()
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty()))
}

/// Parse the page's `__NEXT_DATA__` blob into JSON.
pub(crate) fn parse_next_data(document: &Html, url: &str) -> Result<Value> {
    let text = next_data_text(document)?.ok_or_else(|| BeinError::DataBlobNotFound {
        url: url.to_owned(),
    })?;
    serde_json::from_str(&text).map_err(|e| BeinError::MalformedData {
        url: url.to_owned(),
        source: e,
    })
}

/// Extract trimmed text content of the first element matching `selector`
/// inside `document`. Returns an empty string if nothing matches.
pub(crate) fn select_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|e: ElementRef| e.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Value of `attr` on the first element matching `selector`.
pub(crate) fn select_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|e| e.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalize a media URL to an absolute one.
///
/// Protocol-relative references always become `https`; other relative
/// references are resolved against the page they were found on.
pub(crate) fn absolutize(src: &str, page: &Url) -> String {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{rest}");
    }
    match Url::parse(src) {
        Ok(_) => src.to_string(),
        Err(_) => page
            .join(src)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| src.to_string()),
    }
}
