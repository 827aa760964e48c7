use crate::{error::Result, exposition, state::AppState};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Prometheus 指标导出
pub async fn prometheus_metrics(State(state): State<AppState>) -> Result<Response> {
    let targets = state.targets.list().await?;
    let ids: Vec<i64> = targets.iter().map(|t| t.id).collect();
    let latest = state.metrics.latest_for_targets(&ids).await?;

    debug!(
        targets = targets.len(),
        with_snapshot = latest.len(),
        "Rendering metrics exposition"
    );

    let body = exposition::render(&targets, &latest);
    Ok(([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response())
}
