use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::BeinError;

/// Which round of fixtures to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekSelector {
    /// Ask the fixture overview page which round is active.
    #[default]
    Current,
    Number(u32),
}

impl FromStr for WeekSelector {
    type Err = BeinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("current") {
            return Ok(WeekSelector::Current);
        }
        match s.parse::<u32>() {
            Ok(week) if week > 0 => Ok(WeekSelector::Number(week)),
            _ => Err(BeinError::InvalidWeek(s.to_string())),
        }
    }
}

impl fmt::Display for WeekSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekSelector::Current => f.write_str("current"),
            WeekSelector::Number(week) => write!(f, "{week}"),
        }
    }
}

/// One row of `props.pageProps.data` on a highlights listing page.
///
/// Everything is optional: placeholder rows for bye weeks carry no teams,
/// unplayed matches carry no scores or video. A field of an unexpected JSON
/// type decodes as absent instead of failing the row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMatchRecord {
    pub match_id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub home_team: Option<RawTeam>,
    #[serde(deserialize_with = "lenient")]
    pub away_team: Option<RawTeam>,
    #[serde(deserialize_with = "lenient_text")]
    pub match_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub highlight_video_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub highlight_page_link: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub highlight_thumbnail: Option<String>,
    #[serde(rename = "highLightTitle", deserialize_with = "lenient_text")]
    pub highlight_title: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub match_events: Option<Vec<RawMatchEvent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTeam {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub logo: Option<String>,
    /// Any non-null value means the match has been played.
    pub match_score: Option<Value>,
}

/// A goal or notable moment inside a match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMatchEvent {
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    pub minute: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    pub event_team_side: Option<Value>,
    #[serde(deserialize_with = "lenient_text")]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub thumbnail: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Strings as-is, numbers in their JSON spelling, anything else absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Keeps the decodable items of an array; a non-array is absent.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Kind of an in-match event. The site encodes goals as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Goal,
    Highlight,
}

impl EventKind {
    pub fn from_code(code: i64) -> Self {
        if code == 0 {
            EventKind::Goal
        } else {
            EventKind::Highlight
        }
    }

    /// Map a raw JSON code. Only a numeric zero (`0` or `0.0`) is a goal.
    pub fn from_value(code: &Value) -> Self {
        match code.as_i64() {
            Some(code) => Self::from_code(code),
            None if code.as_f64() == Some(0.0) => EventKind::Goal,
            None => EventKind::Highlight,
        }
    }
}

/// Response body of the fixture endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureWeek {
    pub week: u32,
    /// Set only when the week was detected rather than requested.
    pub current_week: Option<u32>,
    pub matches: Vec<NormalizedMatch>,
}

/// A match as the UI consumes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMatch {
    pub id: String,
    pub match_id: Value,
    pub home: String,
    pub away: String,
    pub home_logo: Option<String>,
    pub away_logo: Option<String>,
    pub score_home: Option<Value>,
    pub score_away: Option<Value>,
    pub date: String,
    pub title: String,
    /// Played and has a highlight video.
    pub has_summary: bool,
    pub video_url: Option<String>,
    pub page_link: Option<String>,
    pub thumbnail: Option<String>,
    pub events: Vec<MatchEvent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub description: Option<String>,
    pub minute: Option<Value>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub side: Option<Value>,
    pub video_url: Option<String>,
    pub thumbnail: Option<String>,
}
