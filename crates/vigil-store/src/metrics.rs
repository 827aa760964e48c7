use crate::db::metric_snapshot;
use crate::error::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Statement,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use vigil_core::MetricSnapshot;

/// 指标快照仓库
///
/// 快照只增不改，按保留策略批量删除。
pub struct MetricStore {
    db: Arc<DatabaseConnection>,
}

impl MetricStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 批量写入一个采集周期的全部快照
    ///
    /// 空批次直接返回。整批一条语句提交，失败则本周期数据全部放弃。
    pub async fn append_batch(&self, snapshots: Vec<MetricSnapshot>) -> Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }
        let count = snapshots.len();
        let models: Vec<metric_snapshot::ActiveModel> =
            snapshots.into_iter().map(Into::into).collect();
        metric_snapshot::Entity::insert_many(models)
            .exec(&*self.db)
            .await?;
        debug!(count, "Persisted metric snapshots");
        Ok(())
    }

    /// 一次查询取回一批目标各自的最新快照
    ///
    /// 告警评估每轮只跑这一条查询，不逐目标查。
    pub async fn latest_for_targets(
        &self,
        target_ids: &[i64],
    ) -> Result<HashMap<i64, MetricSnapshot>> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let id_list = target_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT m.* FROM metric_snapshots m \
             INNER JOIN ( \
                 SELECT target_id, MAX(captured_at) AS latest_at \
                 FROM metric_snapshots \
                 WHERE target_id IN ({id_list}) \
                 GROUP BY target_id \
             ) latest \
             ON m.target_id = latest.target_id AND m.captured_at = latest.latest_at"
        );

        let models = metric_snapshot::Entity::find()
            .from_raw_sql(Statement::from_string(
                self.db.get_database_backend(),
                sql,
            ))
            .all(&*self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| (model.target_id, MetricSnapshot::from(model)))
            .collect())
    }

    /// 单个目标的最新快照
    pub async fn latest_for_target(&self, target_id: i64) -> Result<Option<MetricSnapshot>> {
        let model = metric_snapshot::Entity::find()
            .filter(metric_snapshot::Column::TargetId.eq(target_id))
            .order_by_desc(metric_snapshot::Column::CapturedAt)
            .one(&*self.db)
            .await?;
        Ok(model.map(MetricSnapshot::from))
    }

    /// 查询一个目标自某时刻以来的历史快照，按时间升序
    pub async fn history(
        &self,
        target_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<MetricSnapshot>> {
        let models = metric_snapshot::Entity::find()
            .filter(metric_snapshot::Column::TargetId.eq(target_id))
            .filter(metric_snapshot::Column::CapturedAt.gte(since))
            .order_by_asc(metric_snapshot::Column::CapturedAt)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// 删除某时刻之前的全部快照，返回删除行数
    pub async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = metric_snapshot::Entity::delete_many()
            .filter(metric_snapshot::Column::CapturedAt.lt(cutoff))
            .exec(&*self.db)
            .await?;
        if result.rows_affected > 0 {
            info!(rows = result.rows_affected, "Pruned expired metric snapshots");
        }
        Ok(result.rows_affected)
    }
}
