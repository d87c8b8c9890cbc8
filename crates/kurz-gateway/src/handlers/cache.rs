use crate::error::Result;
use crate::handlers::url::parse_code;
use crate::model::CacheStatsResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

pub async fn evict_cache_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = parse_code(short_code)?;
    state.resolver().evict(&code).await;
    info!(code = %code, "evicted cache entry");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(state.resolver().cache_stats().into())
}
