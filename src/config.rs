use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://beinsports.com.tr";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Site constants and request tuning for [`BeinClient`](crate::BeinClient).
///
/// `Default` carries the values the live site currently needs; use
/// [`ScraperConfig::from_env`] to override them without a rebuild.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Scheme and host every site-relative link is joined onto.
    pub base_url: String,
    /// Detail pages must be on this host or one of its subdomains.
    pub allowed_domain: String,
    /// League slug used in fixture and overview paths.
    pub league: String,
    /// Season segment of the highlights listing path, e.g. `2025-2026`.
    pub season: String,
    /// Week reported when current-week detection fails.
    pub fallback_week: u32,
    pub user_agent: String,
    /// Hostname fragment of the CDN switch that answers with a redirect.
    pub redirector_host: String,
    /// Hostname fragment that marks a URL as a direct CDN file.
    pub cdn_host_hint: String,
    pub request_timeout: Duration,
    pub current_week_timeout: Duration,
    pub resolve_timeout: Duration,
    /// Offset match dates are displayed in.
    pub display_utc_offset_hours: i32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            allowed_domain: "beinsports.com.tr".to_string(),
            league: "super-lig".to_string(),
            season: "2025-2026".to_string(),
            fallback_week: 22,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            redirector_host: "dt-switch.akamaized.net".to_string(),
            cdn_host_hint: "akamaized".to_string(),
            request_timeout: Duration::from_secs(10),
            current_week_timeout: Duration::from_secs(8),
            resolve_timeout: Duration::from_secs(5),
            display_utc_offset_hours: 3,
        }
    }
}

impl ScraperConfig {
    /// Start from the defaults and apply any `BEIN_*` environment overrides.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("BEIN_BASE_URL", defaults.base_url),
            allowed_domain: env_string("BEIN_ALLOWED_DOMAIN", defaults.allowed_domain),
            league: env_string("BEIN_LEAGUE", defaults.league),
            season: env_string("BEIN_SEASON", defaults.season),
            fallback_week: env_parse("BEIN_FALLBACK_WEEK", defaults.fallback_week),
            user_agent: env_string("BEIN_USER_AGENT", defaults.user_agent),
            redirector_host: env_string("BEIN_REDIRECTOR_HOST", defaults.redirector_host),
            cdn_host_hint: defaults.cdn_host_hint,
            request_timeout: env_timeout("BEIN_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            current_week_timeout: defaults.current_week_timeout,
            resolve_timeout: defaults.resolve_timeout,
            display_utc_offset_hours: env_parse(
                "BEIN_DISPLAY_UTC_OFFSET_HOURS",
                defaults.display_utc_offset_hours,
            ),
        }
    }

    /// Root of the site with a trailing slash, sent as `Referer`.
    pub fn referer(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn site_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Bind address of the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_string("HOST", "0.0.0.0".to_string()),
            port: env_parse("PORT", 3000),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, fallback = %default, "ignoring unparseable setting");
            default
        }),
        Err(_) => default,
    }
}

/// Whole seconds; zero would fail every request, so it is ignored.
fn env_timeout(key: &str, default: Duration) -> Duration {
    match env_parse(key, default.as_secs()) {
        0 => {
            warn!(key, fallback = default.as_secs(), "ignoring zero timeout");
            default
        }
        secs => Duration::from_secs(secs),
    }
}
