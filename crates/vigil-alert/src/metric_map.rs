use vigil_core::model::{MetricName, MetricSnapshot};

/// 从快照取规则要比的指标值
///
/// 普通指标缺了就是 None，对应规则这轮不评估。
/// 两个合成吞吐指标缺失方向按 0 计，永远有值。
/// reachable 编码成 1.0/0.0。
pub fn metric_value(snapshot: &MetricSnapshot, metric: MetricName) -> Option<f64> {
    match metric {
        MetricName::Cpu => snapshot.cpu_percent,
        MetricName::CpuTemp => snapshot.cpu_temp,
        MetricName::Ram => snapshot.ram_percent,
        MetricName::Swap => snapshot.swap_percent,
        MetricName::Disk => snapshot.disk_percent,
        MetricName::DiskIo => Some(snapshot.combined_disk_io()),
        MetricName::Processes => snapshot.processes.map(|count| count as f64),
        MetricName::NetIn => snapshot.network_in_kbps,
        MetricName::NetOut => snapshot.network_out_kbps,
        MetricName::NetworkIo => Some(snapshot.combined_network_io()),
        MetricName::Reachable => snapshot.reachable.map(|up| if up { 1.0 } else { 0.0 }),
    }
}
