use ::scraper::{Html, Selector};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::bein_scraper::{self, absolutize, parse_next_data, redirect, select_attr, select_text};
use crate::config::ScraperConfig;
use crate::error::{BeinError, Result};
use crate::model::{VideoExtraction, VideoKind};

const VIDEO_URL_KEYS: [&str; 2] = ["videoUrl", "highlightVideoUrl"];
const FRAME_HINTS: [&str; 3] = ["player", "embed", "video"];
const MAX_SEARCH_DEPTH: usize = 32;
const MAX_SEARCH_NODES: usize = 100_000;

/// Where on the page a video source was found, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    VideoList,
    KeySearch,
    VideoTag,
    Frame,
}

#[derive(Debug, Clone)]
pub(crate) struct FoundVideo {
    pub strategy: Strategy,
    /// Absolute, not yet resolved.
    pub source: String,
    pub title: String,
    pub thumbnail: String,
}

#[instrument(skip(client, resolver, config))]
pub(crate) async fn scrape_video(
    client: &reqwest::Client,
    resolver: &reqwest::Client,
    config: &ScraperConfig,
    page_url: &str,
) -> Result<VideoExtraction> {
    let url = validate_page_url(page_url, config)?;
    let referer = config.referer();
    let body = bein_scraper::get_page(
        client,
        config,
        url.as_str(),
        Some(&referer),
        config.request_timeout,
    )
    .await?;

    let found = extract_video(&body, &url)?;
    debug!(strategy = ?found.strategy, source = %found.source, "found video source");

    let (video_source, video_type) = match found.strategy {
        Strategy::Frame => (found.source, VideoKind::Iframe),
        _ => {
            let resolved = redirect::resolve_redirect(resolver, config, &found.source).await;
            let resolved = absolutize(&resolved, &url);
            let kind = classify(&resolved, config);
            (resolved, kind)
        }
    };

    Ok(VideoExtraction {
        title: found.title,
        thumbnail: found.thumbnail,
        video_source,
        video_type,
        original_url: page_url.to_string(),
    })
}

/// Only pages on the broadcaster's own domain are fetched.
pub(crate) fn validate_page_url(raw: &str, config: &ScraperConfig) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BeinError::InvalidUrl("missing url".to_string()));
    }
    let url = Url::parse(raw).map_err(|_| BeinError::InvalidUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BeinError::InvalidUrl(raw.to_string()));
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let domain = config.allowed_domain.to_ascii_lowercase();
    let allowed =
        !domain.is_empty() && (host == domain || host.ends_with(&format!(".{domain}")));
    if !allowed {
        return Err(BeinError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Run the extraction strategies over a fetched page, first hit wins.
pub(crate) fn extract_video(body: &str, page_url: &Url) -> Result<FoundVideo> {
    let document = Html::parse_document(body);

    let h1 = Selector::parse("h1")?;
    let title_tag = Selector::parse("title")?;
    let og_image = Selector::parse(r#"meta[property="og:image"]"#)?;
    let mut title = Some(select_text(&document, &h1))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| select_text(&document, &title_tag));
    let mut thumbnail = select_attr(&document, &og_image, "content").unwrap_or_default();

    let data = match parse_next_data(&document, page_url.as_str()) {
        Ok(data) => Some(data),
        Err(e @ BeinError::MalformedData { .. }) => {
            warn!(error = %e, "ignoring embedded data");
            None
        }
        Err(e) => {
            debug!(error = %e, "no embedded data, scanning markup");
            None
        }
    };

    let mut hit = None;
    if let Some(data) = &data {
        if let Some(entry) = video_list_entry(data) {
            if let Some(list_title) = entry.title {
                title = list_title;
            }
            if let Some(list_thumbnail) = entry.thumbnail {
                thumbnail = list_thumbnail;
            }
            hit = Some((Strategy::VideoList, entry.video));
        } else if let Some(source) = data
            .pointer("/props/pageProps/data")
            .and_then(find_video_url)
        {
            hit = Some((Strategy::KeySearch, source.to_string()));
        }
    }

    if hit.is_none() {
        hit = video_tag_source(&document)?.map(|src| (Strategy::VideoTag, src));
    }
    if hit.is_none() {
        hit = frame_source(&document)?.map(|src| (Strategy::Frame, src));
    }

    let (strategy, source) = hit.ok_or_else(|| BeinError::VideoNotFound {
        url: page_url.to_string(),
    })?;

    Ok(FoundVideo {
        strategy,
        source: absolutize(&source, page_url),
        title,
        thumbnail,
    })
}

struct VideoListEntry {
    video: String,
    title: Option<String>,
    thumbnail: Option<String>,
}

/// First entry of `props.pageProps.jsonLd.videoListDetails`.
fn video_list_entry(data: &Value) -> Option<VideoListEntry> {
    let json_ld = data.pointer("/props/pageProps/jsonLd")?;
    let first = json_ld.get("videoListDetails")?.as_array()?.first()?;
    let video = non_empty_str(first.get("video"))?;
    Some(VideoListEntry {
        video,
        title: non_empty_str(json_ld.get("videoListTitle")),
        thumbnail: non_empty_str(first.get("thumbnail")),
    })
}

/// Pre-order search for the first `videoUrl`/`highlightVideoUrl` holding an
/// http(s) URL. Bounded in depth and in the number of nodes visited.
pub(crate) fn find_video_url(root: &Value) -> Option<&str> {
    let mut stack = vec![(root, 0usize)];
    let mut visited = 0usize;

    while let Some((node, depth)) = stack.pop() {
        visited += 1;
        if visited > MAX_SEARCH_NODES {
            warn!(visited, "video url search budget exhausted");
            return None;
        }

        match node {
            Value::Object(map) => {
                let found = VIDEO_URL_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(Value::as_str))
                    .find(|url| is_http_url(url));
                if found.is_some() {
                    return found;
                }
                if depth < MAX_SEARCH_DEPTH {
                    push_children(&mut stack, map.values(), depth + 1);
                }
            }
            Value::Array(items) if depth < MAX_SEARCH_DEPTH => {
                push_children(&mut stack, items.iter(), depth + 1);
            }
            _ => {}
        }
    }
    None
}

fn push_children<'a>(
    stack: &mut Vec<(&'a Value, usize)>,
    children: impl DoubleEndedIterator<Item = &'a Value>,
    depth: usize,
) {
    // Reversed so the first child is popped first.
    stack.extend(
        children
            .rev()
            .filter(|child| child.is_object() || child.is_array())
            .map(|child| (child, depth)),
    );
}

fn video_tag_source(document: &Html) -> Result<Option<String>> {
    let source_tag = Selector::parse("video source[src]")?;
    let video_tag = Selector::parse("video[src]")?;
    Ok(select_attr(document, &source_tag, "src").or_else(|| select_attr(document, &video_tag, "src")))
}

fn frame_source(document: &Html) -> Result<Option<String>> {
    let iframe = Selector::parse("iframe[src]")?;
    Ok(document
        .select(&iframe)
        .filter_map(|e| e.value().attr("src"))
        .map(str::trim)
        .find(|src| FRAME_HINTS.iter().any(|hint| src.contains(hint)))
        .map(str::to_string))
}

/// Tell the player what kind of media `url` is.
pub(crate) fn classify(url: &str, config: &ScraperConfig) -> VideoKind {
    let lower = url.to_ascii_lowercase();
    if lower.contains(".m3u8") {
        return VideoKind::Hls;
    }
    if lower.contains(".mp4") {
        return VideoKind::Mp4;
    }
    let on_cdn = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| !config.cdn_host_hint.is_empty() && host.contains(&config.cdn_host_hint));
    if on_cdn {
        VideoKind::Mp4
    } else {
        VideoKind::Unknown
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
