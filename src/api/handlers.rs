//! API Handlers
//!
//! HTTP request handlers for each ops endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{CacheKey, StatsSnapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::facade::DataAccess;
use crate::models::{
    ClearResponse, HealthResponse, InvalidateQuery, InvalidateResponse, PrefixInvalidateResponse,
    ReadQuery, RowsResponse, WriteRequest, WriteResponse,
};
use crate::upstream::RemoteRangeStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Cache-fronted range store
    pub access: DataAccess,
}

impl AppState {
    pub fn new(access: DataAccess) -> Self {
        Self { access }
    }

    /// Builds the facade from configuration around `store`.
    pub fn from_config(config: &Config, store: Arc<dyn RemoteRangeStore>) -> Self {
        Self::new(DataAccess::from_config(config, store))
    }
}

/// Handler for GET /ranges/:range
///
/// Serves the range from the cache, fetching it upstream on a miss.
pub async fn read_range_handler(
    State(state): State<AppState>,
    Path(range): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<RowsResponse>> {
    let key = query.cache_key(&range)?;
    let ttl = query.ttl(state.access.ttl_policy());
    let rows = state.access.read_through(&range, &key, ttl).await?;

    Ok(Json(RowsResponse::new(range, key, rows)))
}

/// Handler for PUT /ranges/:range
///
/// Writes the rows upstream, then drops the named cache key.
pub async fn write_range_handler(
    State(state): State<AppState>,
    Path(range): Path<String>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>> {
    let key = req.invalidate_key()?;

    state
        .access
        .write_through(&range, req.rows, key.as_ref())
        .await?;

    Ok(Json(WriteResponse::new(range, key.map(String::from))))
}

/// Handler for DELETE /cache/:key
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let key: CacheKey = key.parse()?;
    let removed = state.access.invalidate(&key).await;
    Ok(Json(InvalidateResponse::new(key, removed)))
}

/// Handler for DELETE /cache?prefix= and DELETE /cache?all=true
///
/// `all=true` drops every entry; otherwise `prefix` is required.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Response> {
    match (query.all, query.prefix) {
        (true, None) => {
            state.access.clear().await;
            Ok(Json(ClearResponse::cleared()).into_response())
        }
        (true, Some(_)) => Err(CacheError::InvalidRequest(
            "Use either 'prefix' or 'all', not both".to_string(),
        )),
        (false, Some(prefix)) => {
            let removed = state.access.invalidate_by_prefix(&prefix).await?;
            Ok(Json(PrefixInvalidateResponse::new(prefix, removed)).into_response())
        }
        (false, None) => Err(CacheError::InvalidRequest(
            "Missing 'prefix' parameter".to_string(),
        )),
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.access.get_stats().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
