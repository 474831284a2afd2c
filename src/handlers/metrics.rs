//! Prometheus scrape handler

use axum::{extract::State, http::header, response::IntoResponse};

use crate::{AppResult, AppState};

/// Regenerate the fleet and export it as gauges
pub async fn scrape(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.generator.generate(state.config.device_count)?;
    let body = state.metrics.render(&snapshot)?;

    Ok(([(header::CONTENT_TYPE, state.metrics.content_type())], body))
}
