//! Axum route handlers for the Statistics API.

use axum::{extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::stats::aggregator::{aggregate, StatsSummary};

/// GET /resume/stats
///
/// Aggregates every stored analysis. If the records cannot be loaded the whole
/// request fails; no partial buckets are returned.
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsSummary>, AppError> {
    let records = state
        .analyses
        .find_all()
        .await
        .map_err(AppError::AggregationSourceUnavailable)?;

    let summary = aggregate(&records);
    info!(total_resumes = summary.total_resumes, "Computed resume statistics");
    Ok(Json(summary))
}
