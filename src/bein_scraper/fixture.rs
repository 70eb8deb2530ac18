use ::scraper::Html;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::bein_scraper::{self, current_week, parse_next_data};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::model::{
    EventKind, FixtureWeek, MatchEvent, NormalizedMatch, RawMatchEvent, RawMatchRecord,
    WeekSelector,
};

pub(crate) const MATCH_DATE_DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

#[instrument(skip(client, config))]
pub(crate) async fn get_fixture(
    client: &reqwest::Client,
    config: &ScraperConfig,
    selector: WeekSelector,
) -> Result<FixtureWeek> {
    let (week, current_week) = match selector {
        WeekSelector::Current => {
            let week = current_week::detect_current_week(client, config).await;
            (week, Some(week))
        }
        WeekSelector::Number(week) => (week, None),
    };

    let url = fixture_url(config, week);
    let body = bein_scraper::get_page(client, config, &url, None, config.request_timeout).await?;
    let matches = parse_fixture_page(&body, &url, week, config)?;

    debug!(week, matches = matches.len(), "parsed fixture");
    Ok(FixtureWeek {
        week,
        current_week,
        matches,
    })
}

pub(crate) fn fixture_url(config: &ScraperConfig, week: u32) -> String {
    config.site_url(&format!(
        "mac-ozetleri-goller/{}/ozet/{}/{week}/any-mac-ozeti",
        config.league, config.season
    ))
}

fn parse_fixture_page(
    body: &str,
    url: &str,
    week: u32,
    config: &ScraperConfig,
) -> Result<Vec<NormalizedMatch>> {
    let document = Html::parse_document(body);
    let data = parse_next_data(&document, url)?;
    Ok(raw_matches(&data)
        .into_iter()
        .filter_map(|raw| normalize_match(raw, week, config))
        .collect_vec())
}

/// Rows of `props.pageProps.data`. A missing or non-array field means the
/// week has no matches yet.
fn raw_matches(data: &Value) -> Vec<RawMatchRecord> {
    let Some(rows) = data.pointer("/props/pageProps/data").and_then(Value::as_array) else {
        return vec![];
    };
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match RawMatchRecord::deserialize(row) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(index, error = %e, "skipping undecodable match row");
                None
            }
        })
        .collect_vec()
}

/// Build the UI view of a match. Placeholder rows without both team names
/// yield `None`.
pub(crate) fn normalize_match(
    raw: RawMatchRecord,
    week: u32,
    config: &ScraperConfig,
) -> Option<NormalizedMatch> {
    let home = raw.home_team?;
    let away = raw.away_team?;
    let home_name = non_empty(home.name)?;
    let away_name = non_empty(away.name)?;

    let score_home = home.match_score.filter(|s| !s.is_null()).map(normalize_score);
    let score_away = away.match_score.filter(|s| !s.is_null()).map(normalize_score);
    let video_url = non_empty(raw.highlight_video_url);
    let has_summary = score_home.is_some() && score_away.is_some() && video_url.is_some();

    let page_link = non_empty(raw.highlight_page_link).map(|link| {
        if link.starts_with("http://") || link.starts_with("https://") {
            link
        } else {
            config.site_url(&link)
        }
    });

    let title = non_empty(raw.highlight_title)
        .unwrap_or_else(|| format!("{home_name} - {away_name}"));

    let date = raw
        .match_date
        .as_deref()
        .map(|raw_date| format_match_date(raw_date, config.display_utc_offset_hours))
        .unwrap_or_default();

    let match_id = raw.match_id.unwrap_or(Value::Null);
    let events = raw
        .match_events
        .unwrap_or_default()
        .into_iter()
        .map(normalize_event)
        .collect_vec();

    Some(NormalizedMatch {
        id: format!("{week}-{}", id_text(&match_id)),
        match_id,
        home: home_name,
        away: away_name,
        home_logo: non_empty(home.logo),
        away_logo: non_empty(away.logo),
        score_home,
        score_away,
        date,
        title,
        has_summary,
        video_url,
        page_link,
        thumbnail: non_empty(raw.highlight_thumbnail),
        events,
    })
}

fn normalize_event(raw: RawMatchEvent) -> MatchEvent {
    // Anything that is not the goal code, including a missing code, is a highlight.
    let kind = raw
        .kind
        .as_ref()
        .map(EventKind::from_value)
        .unwrap_or(EventKind::Highlight);
    MatchEvent {
        description: raw.description,
        minute: raw.minute,
        kind,
        side: raw.event_team_side,
        video_url: non_empty(raw.video_url),
        thumbnail: non_empty(raw.thumbnail),
    }
}

/// Whole-number floats such as `2.0` are reported as integers. Any other
/// score is passed through as the site sent it.
fn normalize_score(score: Value) -> Value {
    match score.as_f64() {
        Some(f) if score.is_f64() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Value::from(f as u32)
        }
        _ => score,
    }
}

/// Render a source timestamp as `dd.mm.yyyy HH:MM` in the display offset.
/// Timestamps that cannot be parsed are passed through untouched.
pub(crate) fn format_match_date(raw: &str, utc_offset_hours: i32) -> String {
    let Some(offset) = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
    else {
        return raw.to_string();
    };
    match parse_match_date(raw.trim()) {
        Some(date) => date
            .with_timezone(&offset)
            .format(MATCH_DATE_DISPLAY_FORMAT)
            .to_string(),
        None => raw.to_string(),
    }
}

fn parse_match_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }
    // Timestamps without an offset are UTC.
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;

    use super::*;
    use crate::bein_scraper::test_support::{local_config, next_page, serve, serve_recording};
    use crate::error::BeinError;

    fn listing() -> Value {
        json!({
            "props": { "pageProps": { "data": [
                {
                    "matchId": 4101,
                    "homeTeam": { "name": "Galatasaray", "logo": "https://img/gs.png", "matchScore": 2 },
                    "awayTeam": { "name": "Fenerbahçe", "logo": "https://img/fb.png", "matchScore": 1 },
                    "matchDate": "2025-02-14T17:00:00Z",
                    "highlightVideoUrl": "https://dt-switch.akamaized.net/gs-fb.mp4",
                    "highlightPageLink": "/mac-ozetleri-goller/super-lig/ozet/2025-2026/22/gs-fb",
                    "highlightThumbnail": "https://img/gs-fb.jpg",
                    "highLightTitle": "Galatasaray 2-1 Fenerbahçe",
                    "matchEvents": [
                        { "description": "Gol", "minute": 12, "type": 0, "eventTeamSide": 1 },
                        { "description": "Pozisyon", "minute": "45+2", "type": 3, "eventTeamSide": 2,
                          "videoUrl": "https://cdn/p.mp4" },
                        { "description": "Kart", "minute": 70, "type": -1 },
                        { "description": "Belirsiz", "minute": 80 }
                    ]
                },
                {
                    "matchId": 4102,
                    "homeTeam": { "name": "Beşiktaş", "matchScore": 0 },
                    "awayTeam": { "name": "Konyaspor", "matchScore": 0 },
                    "matchDate": "yarın akşam"
                },
                {
                    "matchId": 4103,
                    "homeTeam": { "name": "Trabzonspor", "matchScore": null },
                    "awayTeam": { "name": "Samsunspor", "matchScore": null },
                    "highlightVideoUrl": "https://cdn/preview.mp4"
                },
                { "matchId": 4104, "homeTeam": null, "awayTeam": null },
                { "matchId": 4105, "homeTeam": { "name": "Kasımpaşa" } },
                { "matchId": 4106, "homeTeam": { "name": "" }, "awayTeam": { "name": "Rize" } },
                { "matchId": 4107, "homeTeam": { "name": "Sivas", "matchScore": "two" },
                  "awayTeam": { "name": "Hatay" } }
            ] } }
        })
    }

    #[test]
    fn test_placeholders_are_dropped() {
        let config = ScraperConfig::default();
        let raw = raw_matches(&listing());
        assert_eq!(raw.len(), 7);

        let matches = raw
            .into_iter()
            .filter_map(|r| normalize_match(r, 22, &config))
            .collect_vec();
        assert_eq!(
            matches.iter().map(|m| m.id.as_str()).collect_vec(),
            vec!["22-4101", "22-4102", "22-4103", "22-4107"]
        );
        // A score of an unexpected type still counts as played.
        assert_eq!(matches[3].score_home, Some(json!("two")));
        assert!(matches[3].score_away.is_none());
        assert!(!matches[3].has_summary);
    }

    #[test]
    fn test_rows_with_odd_field_types_are_kept() {
        let config = ScraperConfig::default();
        let data = json!({ "props": { "pageProps": { "data": [
            {
                "matchId": 1,
                "homeTeam": { "name": "Alanyaspor", "matchScore": 2.0 },
                "awayTeam": { "name": "Antalyaspor", "matchScore": 1 },
                "highlightVideoUrl": "https://cdn/a.mp4"
            },
            {
                "matchId": 2,
                "homeTeam": { "name": "Kayserispor" },
                "awayTeam": { "name": "Gaziantep" },
                "matchEvents": [{ "description": 5, "type": 1 }]
            },
            {
                "matchId": 3,
                "homeTeam": { "name": "Başakşehir" },
                "awayTeam": { "name": "Kocaelispor" },
                "matchEvents": [{ "description": "Gol", "type": 0.0 }]
            }
        ] } } });

        let matches = raw_matches(&data)
            .into_iter()
            .filter_map(|r| normalize_match(r, 1, &config))
            .collect_vec();
        assert_eq!(
            matches.iter().map(|m| m.id.as_str()).collect_vec(),
            vec!["1-1", "1-2", "1-3"]
        );

        assert_eq!(matches[0].score_home, Some(json!(2)));
        assert!(matches[0].has_summary);
        assert_eq!(matches[1].events[0].description.as_deref(), Some("5"));
        assert_eq!(matches[2].events[0].kind, EventKind::Goal);
    }

    #[test]
    fn test_has_summary_requires_score_and_video() {
        let config = ScraperConfig::default();
        let matches = raw_matches(&listing())
            .into_iter()
            .filter_map(|r| normalize_match(r, 22, &config))
            .collect_vec();

        for m in &matches {
            let expected =
                m.score_home.is_some() && m.score_away.is_some() && m.video_url.is_some();
            assert_eq!(m.has_summary, expected, "match {}", m.id);
        }
        assert!(matches[0].has_summary);
        // Played, no video.
        assert!(!matches[1].has_summary);
        // Video, not played.
        assert!(!matches[2].has_summary);
    }

    #[test]
    fn test_normalized_fields() {
        let config = ScraperConfig::default();
        let raw = raw_matches(&listing()).remove(0);
        let m = normalize_match(raw, 22, &config).unwrap();

        assert_eq!(m.title, "Galatasaray 2-1 Fenerbahçe");
        assert_eq!(m.date, "14.02.2025 20:00");
        assert_eq!(
            m.page_link.as_deref(),
            Some("https://beinsports.com.tr/mac-ozetleri-goller/super-lig/ozet/2025-2026/22/gs-fb")
        );
        assert_eq!(m.match_id, json!(4101));
        assert_eq!(
            m.events.iter().map(|e| e.kind).collect_vec(),
            vec![
                EventKind::Goal,
                EventKind::Highlight,
                EventKind::Highlight,
                EventKind::Highlight
            ]
        );
        assert_eq!(m.events[1].minute, Some(json!("45+2")));

        let fallback = normalize_match(raw_matches(&listing()).remove(1), 22, &config).unwrap();
        assert_eq!(fallback.title, "Beşiktaş - Konyaspor");
        assert_eq!(fallback.date, "yarın akşam");
        assert!(fallback.page_link.is_none());
    }

    #[test]
    fn test_format_match_date() {
        assert_eq!(format_match_date("2025-08-09T19:00:00+03:00", 3), "09.08.2025 19:00");
        assert_eq!(format_match_date("2025-08-09T16:00:00", 3), "09.08.2025 19:00");
        assert_eq!(format_match_date("2025-08-09T16:00:00.000", 0), "09.08.2025 16:00");
        assert_eq!(format_match_date("2025-12-31T22:30:00Z", 3), "01.01.2026 01:30");
        assert_eq!(format_match_date("not a date", 3), "not a date");
    }

    #[test]
    fn test_format_match_date_with_out_of_range_offset() {
        let raw = "2025-08-09T16:00:00Z";
        assert_eq!(format_match_date(raw, i32::MAX), raw);
        assert_eq!(format_match_date(raw, i32::MIN), raw);
        assert_eq!(format_match_date(raw, 48), raw);
    }

    #[test]
    fn test_missing_data_path_is_empty_week() {
        let data = json!({ "props": { "pageProps": {} } });
        assert!(raw_matches(&data).is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let config = ScraperConfig::default();
        let m = normalize_match(raw_matches(&listing()).remove(0), 22, &config).unwrap();
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["hasSummary"], json!(true));
        assert_eq!(value["scoreHome"], json!(2));
        assert_eq!(value["events"][0]["type"], json!("goal"));
        assert_eq!(value["events"][1]["videoUrl"], json!("https://cdn/p.mp4"));
    }

    /// Overview page reporting round 22 plus the round 22 listing.
    fn site() -> Router {
        let overview = next_page(
            &json!({ "props": { "pageProps": { "orgData": { "activeRound": { "round": 22 } } } } }),
            "",
        );
        let listing_page = next_page(&listing(), "");
        Router::new()
            .route(
                "/lig/super-lig/fikstur",
                get(move || {
                    let page = overview.clone();
                    async move { axum::response::Html(page) }
                }),
            )
            .route(
                "/mac-ozetleri-goller/super-lig/ozet/2025-2026/22/any-mac-ozeti",
                get(move || {
                    let page = listing_page.clone();
                    async move { axum::response::Html(page) }
                }),
            )
    }

    #[tokio::test]
    async fn test_get_fixture_detects_current_week() {
        let base = serve(site()).await;
        let config = local_config(&base);

        let fixture = get_fixture(&reqwest::Client::new(), &config, WeekSelector::Current)
            .await
            .unwrap();
        assert_eq!(fixture.week, 22);
        assert_eq!(fixture.current_week, Some(22));
        assert_eq!(fixture.matches.len(), 4);
    }

    #[tokio::test]
    async fn test_listing_fetches_send_browser_user_agent() {
        let (base, log) = serve_recording(site()).await;
        let config = local_config(&base);

        get_fixture(&reqwest::Client::new(), &config, WeekSelector::Current)
            .await
            .unwrap();

        let seen = log.requests();
        assert_eq!(
            seen.iter().map(|r| r.path.as_str()).collect_vec(),
            vec![
                "/lig/super-lig/fikstur",
                "/mac-ozetleri-goller/super-lig/ozet/2025-2026/22/any-mac-ozeti"
            ]
        );
        for request in &seen {
            assert_eq!(request.user_agent.as_deref(), Some(config.user_agent.as_str()));
            assert!(request.referer.is_none());
        }
    }

    #[tokio::test]
    async fn test_get_fixture_without_blob_is_structure_error() {
        let router = Router::new().route(
            "/mac-ozetleri-goller/super-lig/ozet/2025-2026/5/any-mac-ozeti",
            get(|| async { axum::response::Html("<html><body>yeni tasarım</body></html>") }),
        );
        let base = serve(router).await;
        let config = local_config(&base);

        let err = get_fixture(&reqwest::Client::new(), &config, WeekSelector::Number(5))
            .await
            .unwrap_err();
        assert!(matches!(err, BeinError::DataBlobNotFound { .. }));
    }
}
