use crate::config::MonitorConfig;
use chrono::{Duration, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::time::interval;
use tracing::{error, info};
use vigil_alert::AlertEngine;
use vigil_probe::ProbeOrchestrator;
use vigil_store::MetricStore;

/// 后台调度器
///
/// 采集评估循环每轮先采集后评估，严格串行；保留策略循环独立计时。
/// 单轮失败只记日志，不影响后续轮次。
pub struct Scheduler {
    orchestrator: ProbeOrchestrator,
    engine: AlertEngine,
    metrics: MetricStore,
    probe_interval: StdDuration,
    retention_interval: StdDuration,
    retention_days: i64,
}

impl Scheduler {
    pub fn new(
        orchestrator: ProbeOrchestrator,
        engine: AlertEngine,
        metrics: MetricStore,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            orchestrator,
            engine,
            metrics,
            probe_interval: StdDuration::from_secs(config.probe_interval_seconds),
            retention_interval: StdDuration::from_secs(config.retention_interval_seconds),
            retention_days: config.retention_days,
        }
    }

    /// 启动采集评估循环
    pub async fn start_monitor_loop(self: Arc<Self>) {
        info!(
            interval_seconds = self.probe_interval.as_secs(),
            "Starting monitor loop"
        );

        let mut interval = interval(self.probe_interval);
        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    /// 启动快照保留循环
    pub async fn start_retention_loop(self: Arc<Self>) {
        info!(
            interval_seconds = self.retention_interval.as_secs(),
            retention_days = self.retention_days,
            "Starting retention loop"
        );

        let mut interval = interval(self.retention_interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.prune_expired().await {
                error!("Snapshot retention failed: {}", e);
            }
        }
    }

    /// 单轮：采集一遍再评估一遍
    async fn run_once(&self) {
        if let Err(e) = self.orchestrator.run_cycle().await {
            error!("Probe cycle failed: {}", e);
        }
        if let Err(e) = self.engine.evaluate_cycle().await {
            error!("Alert evaluation failed: {}", e);
        }
    }

    /// 删除超出保留窗口的快照
    async fn prune_expired(&self) -> vigil_store::Result<u64> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        self.metrics.delete_before(cutoff).await
    }
}
