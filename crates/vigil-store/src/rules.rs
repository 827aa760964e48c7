use crate::db::{alert_rule, rule_from_model};
use crate::error::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{debug, warn};
use vigil_core::AlertRule;

/// 告警规则仓库
pub struct RuleStore {
    db: Arc<DatabaseConnection>,
}

impl RuleStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 加载全部启用的规则
    ///
    /// 指标名或操作符认不出的规则跳过并告警，不让一条脏数据
    /// 拖垮整轮评估。
    pub async fn list_enabled(&self) -> Result<Vec<AlertRule>> {
        let models = alert_rule::Entity::find()
            .filter(alert_rule::Column::Enabled.eq(true))
            .all(&*self.db)
            .await?;

        let mut rules = Vec::with_capacity(models.len());
        for model in models {
            let rule_id = model.id;
            let metric = model.metric.clone();
            let operator = model.operator.clone();
            match rule_from_model(model) {
                Some(rule) => rules.push(rule),
                None => warn!(
                    rule_id,
                    metric = %metric,
                    operator = %operator,
                    "Skipping rule with unknown metric or operator"
                ),
            }
        }
        debug!(count = rules.len(), "Loaded enabled alert rules");
        Ok(rules)
    }
}
