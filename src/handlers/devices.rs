//! Device snapshot handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::{AppError, AppResult, AppState};
use crate::models::{DeviceFilter, Snapshot};

/// Surface malformed query strings through the JSON error body
fn device_filter(query: Result<Query<DeviceFilter>, QueryRejection>) -> AppResult<DeviceFilter> {
    query
        .map(|Query(filter)| filter)
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}

/// Draw a snapshot for one request, applying the query's count and status filter
fn snapshot_for(state: &AppState, filter: &DeviceFilter) -> AppResult<Snapshot> {
    let status = filter.status().map_err(AppError::ValidationError)?;
    let count = filter.count.unwrap_or(state.config.device_count);

    let snapshot = state.generator.generate(count)?;

    Ok(match status {
        Some(status) => snapshot.filter_status(status),
        None => snapshot,
    })
}

/// Fresh JSON snapshot of the fleet
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<DeviceFilter>, QueryRejection>,
) -> AppResult<Json<Snapshot>> {
    let filter = device_filter(query)?;
    Ok(Json(snapshot_for(&state, &filter)?))
}

/// Fresh snapshot as a CSV download
pub async fn export_csv(
    State(state): State<AppState>,
    query: Result<Query<DeviceFilter>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let filter = device_filter(query)?;
    let snapshot = snapshot_for(&state, &filter)?;
    tracing::info!("Exporting {} devices as CSV", snapshot.devices.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"edge_metrics.csv\""),
        ],
        snapshot.to_csv(),
    ))
}
