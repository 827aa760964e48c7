use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use vigil_core::{MetricSnapshot, Target};

/// 快照的对外 JSON 形状
///
/// 字段缺失序列化成 null，不补零。
#[derive(Debug, Serialize)]
pub struct SnapshotView {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: Option<f64>,
    pub cpu_temp: Option<f64>,
    pub ram_percent: Option<f64>,
    pub swap_percent: Option<f64>,
    pub disk_percent: Option<f64>,
    pub disk_io_read: Option<f64>,
    pub disk_io_write: Option<f64>,
    pub processes: Option<i64>,
    pub network_in_kbps: Option<f64>,
    pub network_out_kbps: Option<f64>,
    /// 出入流量合并换算成 MB/s，保留两位小数
    pub network_io: f64,
    pub reachable: Option<bool>,
    pub services_status: Option<HashMap<String, bool>>,
    pub ports_status: Option<HashMap<String, bool>>,
}

impl From<MetricSnapshot> for SnapshotView {
    fn from(snapshot: MetricSnapshot) -> Self {
        let network_io = snapshot.combined_network_io();
        Self {
            timestamp: snapshot.captured_at,
            cpu_percent: snapshot.cpu_percent,
            cpu_temp: snapshot.cpu_temp,
            ram_percent: snapshot.ram_percent,
            swap_percent: snapshot.swap_percent,
            disk_percent: snapshot.disk_percent,
            disk_io_read: snapshot.disk_io_read,
            disk_io_write: snapshot.disk_io_write,
            processes: snapshot.processes,
            network_in_kbps: snapshot.network_in_kbps,
            network_out_kbps: snapshot.network_out_kbps,
            network_io,
            reachable: snapshot.reachable,
            services_status: snapshot.services_status,
            ports_status: snapshot.ports_status,
        }
    }
}

/// 目标响应，带最新快照
#[derive(Debug, Serialize)]
pub struct TargetWithLatest {
    pub id: i64,
    pub hostname: String,
    pub address: String,
    pub system_name: Option<String>,
    pub owner: Option<String>,
    pub environment: String,
    pub tags: Option<String>,
    pub is_cluster: bool,
    pub source: String,
    pub latest_metric: Option<SnapshotView>,
}

impl TargetWithLatest {
    pub fn new(target: Target, snapshot: Option<MetricSnapshot>) -> Self {
        Self {
            id: target.id,
            hostname: target.hostname,
            address: target.address,
            system_name: target.system_name,
            owner: target.owner,
            environment: target.environment,
            tags: target.tags,
            is_cluster: target.is_cluster,
            source: target.source.as_str().to_string(),
            latest_metric: snapshot.map(SnapshotView::from),
        }
    }
}
