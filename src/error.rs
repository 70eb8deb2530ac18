use ::scraper::error::SelectorErrorKind;

/// All errors that can occur while scraping beIN Sports pages.
#[derive(thiserror::Error, Debug)]
pub enum BeinError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(reqwest::Error),

    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// The page no longer carries the embedded `__NEXT_DATA__` blob.
    #[error("page structure changed: no embedded data found on {url}")]
    DataBlobNotFound { url: String },

    /// The embedded data blob is not valid JSON.
    #[error("malformed embedded data on {url}: {source}")]
    MalformedData {
        url: String,
        source: serde_json::Error,
    },

    /// The requested page URL is missing, malformed, or outside the allowed domain.
    #[error("invalid or missing beIN Sports URL: {0}")]
    InvalidUrl(String),

    /// The requested week is neither a positive number nor `current`.
    #[error("invalid week: {0}")]
    InvalidWeek(String),

    /// Every video extraction strategy came up empty.
    #[error("no video source found on {url}")]
    VideoNotFound { url: String },
}

impl<'a> From<SelectorErrorKind<'a>> for BeinError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        BeinError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BeinError>;
