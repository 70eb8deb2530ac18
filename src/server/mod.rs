mod error;
pub mod handlers;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::BeinClient;

#[derive(Clone)]
pub struct AppState {
    pub client: BeinClient,
}

/// JSON API consumed by the highlights UI.
pub fn router(client: BeinClient) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/fixture", get(handlers::get_fixture))
        .route("/api/scrape", get(handlers::scrape))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { client })
}
