use crate::db::target;
use crate::error::Result;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;
use tracing::debug;
use vigil_core::Target;

/// 监控目标仓库
///
/// 目标的增删改由管理层负责，采集与告警这边只读。
pub struct TargetStore {
    db: Arc<DatabaseConnection>,
}

impl TargetStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 列出全部目标
    pub async fn list(&self) -> Result<Vec<Target>> {
        let models = target::Entity::find().all(&*self.db).await?;
        debug!(count = models.len(), "Loaded targets");
        Ok(models.into_iter().map(Target::from).collect())
    }

    /// 按 ID 查询目标
    pub async fn get(&self, id: i64) -> Result<Option<Target>> {
        let model = target::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(model.map(Target::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;
    use sea_orm::Database;
    use vigil_core::SourceMode;

    async fn setup() -> TargetStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&db).await.unwrap();
        TargetStore::new(Arc::new(db))
    }

    async fn seed(store: &TargetStore, target: Target) {
        let active: target::ActiveModel = target.into();
        target::Entity::insert(active)
            .exec(&*store.db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let store = setup().await;
        assert!(store.list().await.unwrap().is_empty());

        let mut t1 = Target::new("web-01", "10.0.0.5");
        t1.monitored_services = vec!["nginx".to_string()];
        t1.monitored_ports = vec![80, 443];
        seed(&store, t1).await;

        let mut t2 = Target::new("db-01", "10.0.0.6");
        t2.source = SourceMode::Snmp;
        seed(&store, t2).await;

        let targets = store.list().await.unwrap();
        assert_eq!(targets.len(), 2);

        let first = store.get(targets[0].id).await.unwrap().unwrap();
        assert_eq!(first.hostname, "web-01");
        assert_eq!(first.monitored_services, vec!["nginx"]);
        assert_eq!(first.monitored_ports, vec![80, 443]);

        assert!(store.get(9999).await.unwrap().is_none());
    }
}
