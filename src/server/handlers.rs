//! Route handlers for the JSON API

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::search::{SearchResult, search as rank_search};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    tokens: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SearchResponse {
    fn ok(tokens: Vec<SearchResult>) -> (StatusCode, Json<Self>) {
        (StatusCode::OK, Json(Self { tokens, error: None }))
    }

    fn failed() -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                tokens: Vec::new(),
                error: Some("Failed to search tokens".to_string()),
            }),
        )
    }
}

/// `GET /api/search?query=` or `?id=`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<SearchResponse>) {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    if let Some(query) = query {
        return match state.catalog.get_catalog().await {
            Ok(snapshot) => SearchResponse::ok(rank_search(&snapshot.tokens, query)),
            Err(e) => {
                log::error!("Search for '{}' failed: {}", query, e);
                SearchResponse::failed()
            }
        };
    }

    let Some(id) = params.id.as_deref().and_then(|id| id.trim().parse::<u64>().ok()) else {
        return SearchResponse::ok(Vec::new());
    };

    match state.catalog.find_by_id(id).await {
        Ok(token) => SearchResponse::ok(token.iter().map(SearchResult::from).collect()),
        Err(e) => {
            log::error!("Lookup of id {} failed: {}", id, e);
            SearchResponse::failed()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsParams {
    ids: Option<String>,
}

/// Parse a comma-separated id list; `None` if empty or any entry is not an id
fn parse_ids(raw: &str) -> Option<Vec<u64>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    (!ids.is_empty()).then_some(ids)
}

/// `GET /api/token-metrics?ids=1,1027`
pub async fn token_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsParams>,
) -> Response {
    let Some(ids) = params.ids.as_deref().and_then(parse_ids) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "ids parameter is required (comma-separated numeric ids)"})),
        )
            .into_response();
    };

    match state.metrics.fetch_metrics(&ids).await {
        Ok(metrics) => Json(metrics).into_response(),
        Err(e) => {
            log::error!("Token metrics for {:?} failed: {}", ids, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch token metrics"})),
            )
                .into_response()
        }
    }
}

/// `POST /api/tokens/refresh`, `POST /api/refresh-cache`
pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog.refresh_catalog().await {
        Ok(count) => Json(json!({"success": true, "tokenCount": count})).into_response(),
        Err(e) => {
            log::error!("Token list refresh failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to refresh token list"})),
            )
                .into_response()
        }
    }
}

/// `GET /api/tokens/status`, `GET /api/cache-status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({"lastUpdate": state.catalog.last_update_time().await}))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "lastUpdate": state.catalog.last_update_time().await,
    }))
}
