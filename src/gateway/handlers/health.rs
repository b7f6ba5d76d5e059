//! Health check handler

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::error::AppError;
use crate::repository::{Backend, TransactionManager};

/// Health check response data
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    pub timestamp_ms: i64,
}

/// GET /health
///
/// Pings the database; internal details are logged, not returned.
pub async fn health_check<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
) -> ApiResult<HealthResponse> {
    if let Err(e) = state.transactions.health_check().await {
        tracing::error!("[HEALTH] database ping failed: {}", e);
        return Err(AppError::internal("unavailable"));
    }

    ok(HealthResponse {
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
    })
}
