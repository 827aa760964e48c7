use crate::db::alert_event;
use crate::error::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use std::sync::Arc;
use tracing::debug;
use vigil_core::AlertEvent;

/// 告警事件仓库
///
/// 事件只追加，不更新。
pub struct EventStore {
    db: Arc<DatabaseConnection>,
}

impl EventStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 追加一条告警事件，返回带 ID 的记录
    pub async fn append(&self, event: AlertEvent) -> Result<AlertEvent> {
        let active: alert_event::ActiveModel = event.into();
        let model = active.insert(&*self.db).await?;
        debug!(
            event_id = model.id,
            rule_id = model.rule_id,
            "Alert event recorded"
        );
        Ok(model.into())
    }

    /// 最近的事件，按触发时间倒序
    pub async fn recent(&self, limit: u64) -> Result<Vec<AlertEvent>> {
        let models = alert_event::Entity::find()
            .order_by_desc(alert_event::Column::TriggeredAt)
            .limit(limit)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;
    use sea_orm::Database;

    async fn setup() -> EventStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&db).await.unwrap();
        EventStore::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_append_assigns_id() {
        let store = setup().await;
        let event = AlertEvent::new(3, Some(1), Some(95.0), "cpu > 90 (value=95)");
        let saved = store.append(event).await.unwrap();
        assert!(saved.id > 0);
        assert_eq!(saved.rule_id, 3);
        assert_eq!(saved.value, Some(95.0));
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let store = setup().await;
        let mut first = AlertEvent::new(1, Some(1), Some(91.0), "第一条");
        first.triggered_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        let mut second = AlertEvent::new(2, Some(1), Some(92.0), "第二条");
        second.triggered_at = chrono::Utc::now();
        store.append(first).await.unwrap();
        store.append(second).await.unwrap();

        let events = store.recent(10).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].rule_id, 2);
        assert_eq!(events[1].rule_id, 1);
    }
}
