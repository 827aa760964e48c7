use std::collections::HashMap;
use vigil_core::{MetricSnapshot, Target};

/// Prometheus 文本格式的内容类型
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// 导出序列，头部与样本都按这个顺序
const SERIES: [(&str, &str); 11] = [
    (
        "target_reachable",
        "Target reachability by ping (1 reachable, 0 unreachable)",
    ),
    ("target_cpu_percent", "CPU usage percent"),
    ("target_cpu_temp", "CPU temperature in Celsius"),
    ("target_ram_percent", "RAM usage percent"),
    ("target_swap_percent", "Swap usage percent"),
    ("target_disk_percent", "Disk usage percent"),
    ("target_disk_io_read_mb", "Disk read throughput in MB/s"),
    ("target_disk_io_write_mb", "Disk write throughput in MB/s"),
    ("target_processes", "Number of processes"),
    ("target_net_in_kbps", "Network input kbps"),
    ("target_net_out_kbps", "Network output kbps"),
];

/// 渲染 Prometheus 文本
///
/// 头部无条件全部输出，样本按目标分组；没有快照的目标整组跳过，
/// 缺失的字段不输出样本行。
pub fn render(targets: &[Target], latest: &HashMap<i64, MetricSnapshot>) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (name, help) in SERIES {
        lines.push(format!("# HELP {} {}", name, help));
        lines.push(format!("# TYPE {} gauge", name));
    }

    for target in targets {
        let snapshot = match latest.get(&target.id) {
            Some(snapshot) => snapshot,
            None => continue,
        };

        let labels = format!(
            "target_id=\"{}\",hostname=\"{}\",address=\"{}\"",
            target.id,
            escape_label(&target.hostname),
            escape_label(&target.address)
        );

        if let Some(reachable) = snapshot.reachable {
            let value = if reachable { 1.0 } else { 0.0 };
            lines.push(sample("target_reachable", &labels, value));
        }
        if let Some(value) = snapshot.cpu_percent {
            lines.push(sample("target_cpu_percent", &labels, value));
        }
        if let Some(value) = snapshot.cpu_temp {
            lines.push(sample("target_cpu_temp", &labels, value));
        }
        if let Some(value) = snapshot.ram_percent {
            lines.push(sample("target_ram_percent", &labels, value));
        }
        if let Some(value) = snapshot.swap_percent {
            lines.push(sample("target_swap_percent", &labels, value));
        }
        if let Some(value) = snapshot.disk_percent {
            lines.push(sample("target_disk_percent", &labels, value));
        }
        if let Some(value) = snapshot.disk_io_read {
            lines.push(sample("target_disk_io_read_mb", &labels, value));
        }
        if let Some(value) = snapshot.disk_io_write {
            lines.push(sample("target_disk_io_write_mb", &labels, value));
        }
        if let Some(processes) = snapshot.processes {
            lines.push(sample("target_processes", &labels, processes as f64));
        }
        if let Some(value) = snapshot.network_in_kbps {
            lines.push(sample("target_net_in_kbps", &labels, value));
        }
        if let Some(value) = snapshot.network_out_kbps {
            lines.push(sample("target_net_out_kbps", &labels, value));
        }
    }

    lines.join("\n") + "\n"
}

fn sample(name: &str, labels: &str, value: f64) -> String {
    format!("{}{{{}}} {}", name, labels, value)
}

/// 标签值转义，先反斜杠后引号
fn escape_label(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
