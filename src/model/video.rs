use serde::Serialize;

/// How the player should treat a resolved video source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VideoKind {
    /// HLS streaming manifest (`.m3u8`).
    Hls,
    /// Direct progressive file.
    Mp4,
    /// Third-party player page, to be embedded rather than played.
    Iframe,
    #[default]
    Unknown,
}

/// Response body of the scrape endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoExtraction {
    pub title: String,
    pub thumbnail: String,
    /// Always absolute.
    pub video_source: String,
    pub video_type: VideoKind,
    pub original_url: String,
}
