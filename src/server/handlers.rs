use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{BeinError, Result};
use crate::model::{FixtureWeek, VideoExtraction, WeekSelector};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct FixtureQuery {
    pub week: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeQuery {
    pub url: Option<String>,
}

/// `GET /api/fixture?week=<n|current>`
pub async fn get_fixture(
    State(state): State<AppState>,
    Query(query): Query<FixtureQuery>,
) -> Result<Json<FixtureWeek>> {
    let week: WeekSelector = query.week.as_deref().unwrap_or("current").parse()?;
    let fixture = state.client.get_fixture(week).await?;
    Ok(Json(fixture))
}

/// `GET /api/scrape?url=<match page>`
pub async fn scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<VideoExtraction>> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| BeinError::InvalidUrl("missing url".to_string()))?;
    let video = state.client.scrape_video(&url).await?;
    Ok(Json(video))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
