use crate::{
    error::{ApiError, Result},
    models::{SnapshotView, TargetWithLatest},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::debug;

/// 历史查询参数
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub minutes: Option<i64>,
}

/// 目标总览，每个目标带最新快照
pub async fn list_targets(State(state): State<AppState>) -> Result<Json<Vec<TargetWithLatest>>> {
    let targets = state.targets.list().await?;
    let ids: Vec<i64> = targets.iter().map(|t| t.id).collect();
    let mut latest = state.metrics.latest_for_targets(&ids).await?;

    let items = targets
        .into_iter()
        .map(|target| {
            let snapshot = latest.remove(&target.id);
            TargetWithLatest::new(target, snapshot)
        })
        .collect();

    Ok(Json(items))
}

/// 单目标历史快照，按采集时间升序
pub async fn target_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<SnapshotView>>> {
    if state.targets.get(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Target {} not found", id)));
    }

    // 查询窗口限制在 1 分钟到 24 小时
    let minutes = query.minutes.unwrap_or(120).clamp(1, 1440);
    let since = Utc::now() - Duration::minutes(minutes);
    debug!(target_id = id, minutes, "Loading snapshot history");

    let snapshots = state.metrics.history(id, since).await?;
    Ok(Json(snapshots.into_iter().map(SnapshotView::from).collect()))
}
