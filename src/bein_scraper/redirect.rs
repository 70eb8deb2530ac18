use reqwest::header::{LOCATION, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::config::ScraperConfig;

/// Client for [`resolve_redirect`]: the `Location` header is the answer, so
/// redirects must not be followed.
pub(crate) fn resolver_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().redirect(Policy::none()).build()
}

/// Follow one hop of the CDN switch, if `url` points at it.
///
/// Best effort: any failure leaves the URL as it was.
#[instrument(skip(resolver, config))]
pub(crate) async fn resolve_redirect(
    resolver: &reqwest::Client,
    config: &ScraperConfig,
    url: &str,
) -> String {
    if config.redirector_host.is_empty() || !url.contains(config.redirector_host.as_str()) {
        return url.to_string();
    }

    let response = resolver
        .head(url)
        .timeout(config.resolve_timeout)
        .header(USER_AGENT, config.user_agent.as_str())
        .header(REFERER, config.referer())
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!(url, error = %e, "failed to resolve redirect");
            return url.to_string();
        }
    };

    let status = response.status();
    if status != StatusCode::MOVED_PERMANENTLY && status != StatusCode::FOUND {
        debug!(url, %status, "redirector answered without redirect");
        return url.to_string();
    }

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|l| !l.is_empty());

    match location {
        Some(location) if Url::parse(location).is_ok() => {
            debug!(url, location, "resolved redirect");
            location.to_string()
        }
        Some(location) => Url::parse(url)
            .and_then(|base| base.join(location))
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|_| url.to_string()),
        None => {
            debug!(url, %status, "redirect without location");
            url.to_string()
        }
    }
}
