use crate::metric_map::metric_value;
use std::collections::HashSet;
use tracing::{debug, info};
use vigil_core::model::AlertEvent;
use vigil_notify::{AlertDispatcher, AlertMessage};
use vigil_store::error::Result as StoreResult;
use vigil_store::events::EventStore;
use vigil_store::metrics::MetricStore;
use vigil_store::rules::RuleStore;

/// 告警评估引擎
///
/// 每轮把启用规则过一遍：规则引用到的目标最新快照一次性
/// 批量取回，逐条比阈值。命中先记事件再广播通知，
/// 通知失败不影响已落库的事件。
pub struct AlertEngine {
    rules: RuleStore,
    metrics: MetricStore,
    events: EventStore,
    dispatcher: AlertDispatcher,
}

impl AlertEngine {
    pub fn new(
        rules: RuleStore,
        metrics: MetricStore,
        events: EventStore,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            rules,
            metrics,
            events,
            dispatcher,
        }
    }

    /// 评估一轮，返回触发的事件数
    pub async fn evaluate_cycle(&self) -> StoreResult<usize> {
        let rules = self.rules.list_enabled().await?;
        if rules.is_empty() {
            debug!("No enabled alert rules");
            return Ok(0);
        }

        let mut seen = HashSet::new();
        let target_ids: Vec<i64> = rules
            .iter()
            .filter_map(|rule| rule.target_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let latest = self.metrics.latest_for_targets(&target_ids).await?;

        let mut triggered = 0usize;
        for rule in &rules {
            let target_id = match rule.target_id {
                Some(id) => id,
                // 组规则在管理层展开成目标规则，引擎不直接评估
                None => continue,
            };
            let snapshot = match latest.get(&target_id) {
                Some(snapshot) => snapshot,
                None => continue,
            };
            let threshold = match rule.threshold {
                Some(threshold) => threshold,
                None => {
                    debug!(rule_id = rule.id, "Rule has no threshold");
                    continue;
                }
            };
            // 指标缺失不评估，既不报警也不算恢复
            let value = match metric_value(snapshot, rule.metric) {
                Some(value) => value,
                None => continue,
            };

            if !rule.operator.compare(value, threshold) {
                continue;
            }

            let message = format!(
                "Rule '{}' triggered on target {}: {} {} {} (value={})",
                rule.name,
                target_id,
                rule.metric.as_str(),
                rule.operator.as_str(),
                threshold,
                value
            );
            info!(
                rule_id = rule.id,
                target_id,
                value,
                severity = rule.severity.as_str(),
                "Alert rule triggered"
            );

            self.events
                .append(AlertEvent::new(rule.id, Some(target_id), Some(value), &message))
                .await?;
            triggered += 1;

            self.dispatcher
                .broadcast(&AlertMessage::new(message, rule.severity))
                .await;
        }

        if triggered > 0 {
            info!(triggered, "Alert evaluation cycle completed");
        }
        Ok(triggered)
    }
}
