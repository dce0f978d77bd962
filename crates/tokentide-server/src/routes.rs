//! HTTP routing and the pull-side handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use tokentide_core::{query, SnapshotBroadcaster, TokenAggregator, TokenPage, TokenQuery};

use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<TokenAggregator>,
    pub broadcaster: SnapshotBroadcaster,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tokens", get(list_tokens))
        .route("/health", get(health))
        .route("/stream", get(ws::stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Current result set, sorted and paginated per the query string. Serves
/// the cached snapshot when live, refreshing on demand otherwise.
async fn list_tokens(
    State(state): State<AppState>,
    Query(params): Query<TokenQuery>,
) -> Json<TokenPage> {
    let snapshot = state.aggregator.snapshot().await;
    Json(query::apply(&snapshot, &params))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    tokens: usize,
    snapshot_age_secs: Option<u64>,
}

/// Liveness plus a view of the cache; never triggers a fetch.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cached = state.aggregator.peek().await;
    Json(HealthResponse {
        status: "ok",
        tokens: cached.as_ref().map(|s| s.len()).unwrap_or(0),
        snapshot_age_secs: cached.map(|s| s.generated_at.age().as_secs()),
    })
}
