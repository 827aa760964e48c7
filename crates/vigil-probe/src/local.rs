use crate::error::{CollectError, FieldResult};
use crate::partial::{merge_into, PartialSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use sysinfo::{Components, Disks, Networks, System};
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::debug;

/// 吞吐采样窗口，CPU 使用率与网络、磁盘速率共用
const SAMPLE_WINDOW: Duration = Duration::from_secs(1);
/// systemctl 查询超时
const SERVICE_TIMEOUT: Duration = Duration::from_secs(5);
/// 端口连接超时
const PORT_TIMEOUT: Duration = Duration::from_secs(2);

/// 本机采集接口
///
/// 本机读数没法像远程方式那样指向一台测试机，
/// 编排层通过这个接口注入测试替身。
#[async_trait]
pub trait LocalProbe: Send + Sync {
    async fn collect(&self, services: &[String], ports: &[u16]) -> PartialSnapshot;
}

/// 读取本机真实读数的采集器
pub struct LocalCollector;

#[async_trait]
impl LocalProbe for LocalCollector {
    async fn collect(&self, services: &[String], ports: &[u16]) -> PartialSnapshot {
        let mut partial = PartialSnapshot::default();

        let mut sys = System::new_all();
        let mut networks = Networks::new_with_refreshed_list();
        let (net_in_before, net_out_before) = network_totals(&networks);
        let disk_before = read_disk_counters();

        tokio::time::sleep(SAMPLE_WINDOW).await;

        sys.refresh_cpu_usage();
        networks.refresh();
        let (net_in_after, net_out_after) = network_totals(&networks);
        let disk_after = read_disk_counters();
        let elapsed = SAMPLE_WINDOW.as_secs_f64();

        merge_into(
            &mut partial.cpu_percent,
            "cpu_percent",
            Ok(sys.global_cpu_usage() as f64),
        );
        merge_into(
            &mut partial.ram_percent,
            "ram_percent",
            memory_percent(sys.used_memory(), sys.total_memory()),
        );
        merge_into(
            &mut partial.swap_percent,
            "swap_percent",
            swap_percent(sys.used_swap(), sys.total_swap()),
        );
        merge_into(&mut partial.disk_percent, "disk_percent", root_disk_percent());
        merge_into(
            &mut partial.processes,
            "processes",
            Ok(sys.processes().len() as i64),
        );
        merge_into(&mut partial.cpu_temp, "cpu_temp", cpu_temperature());

        merge_into(
            &mut partial.network_in_kbps,
            "network_in_kbps",
            Ok(net_in_after.saturating_sub(net_in_before) as f64 * 8.0 / 1024.0 / elapsed),
        );
        merge_into(
            &mut partial.network_out_kbps,
            "network_out_kbps",
            Ok(net_out_after.saturating_sub(net_out_before) as f64 * 8.0 / 1024.0 / elapsed),
        );

        match (disk_before, disk_after) {
            (Ok((read_before, write_before)), Ok((read_after, write_after))) => {
                merge_into(
                    &mut partial.disk_io_read,
                    "disk_io_read",
                    Ok(read_after.saturating_sub(read_before) as f64 / (1024.0 * 1024.0) / elapsed),
                );
                merge_into(
                    &mut partial.disk_io_write,
                    "disk_io_write",
                    Ok(write_after.saturating_sub(write_before) as f64
                        / (1024.0 * 1024.0)
                        / elapsed),
                );
            }
            (Err(e), _) | (_, Err(e)) => {
                debug!(error = %e, "Disk counters unavailable");
            }
        }

        if !services.is_empty() {
            let mut status = HashMap::new();
            for service in services {
                status.insert(service.clone(), check_service(service).await);
            }
            partial.services_status = Some(status);
        }

        if !ports.is_empty() {
            let mut status = HashMap::new();
            for port in ports {
                status.insert(port.to_string(), check_port(*port).await);
            }
            partial.ports_status = Some(status);
        }

        partial
    }
}

/// 全部网卡的累计收发字节数
fn network_totals(networks: &Networks) -> (u64, u64) {
    let mut received = 0u64;
    let mut transmitted = 0u64;
    for (_name, data) in networks {
        received += data.total_received();
        transmitted += data.total_transmitted();
    }
    (received, transmitted)
}

fn memory_percent(used: u64, total: u64) -> FieldResult<f64> {
    if total == 0 {
        return Err(CollectError::unavailable("total memory reported as zero"));
    }
    Ok(used as f64 / total as f64 * 100.0)
}

/// 没有交换区时使用率按 0 记，不算缺失
fn swap_percent(used: u64, total: u64) -> FieldResult<f64> {
    if total == 0 {
        return Ok(0.0);
    }
    Ok(used as f64 / total as f64 * 100.0)
}

fn root_disk_percent() -> FieldResult<f64> {
    let disks = Disks::new_with_refreshed_list();
    for disk in &disks {
        if disk.mount_point() == std::path::Path::new("/") {
            let total = disk.total_space();
            if total == 0 {
                return Err(CollectError::unavailable("root filesystem reports zero size"));
            }
            let used = total.saturating_sub(disk.available_space());
            return Ok(used as f64 / total as f64 * 100.0);
        }
    }
    Err(CollectError::unavailable("root filesystem not found"))
}

/// 取第一个标签带 core/cpu 的温度传感器读数
fn cpu_temperature() -> FieldResult<f64> {
    let components = Components::new_with_refreshed_list();
    for component in &components {
        let label = component.label().to_lowercase();
        if label.contains("core") || label.contains("cpu") {
            let temperature = component.temperature();
            if temperature.is_finite() {
                return Ok(temperature as f64);
            }
        }
    }
    Err(CollectError::unavailable("no cpu temperature sensor"))
}

fn read_disk_counters() -> FieldResult<(u64, u64)> {
    let content = std::fs::read_to_string("/proc/diskstats")
        .map_err(|e| CollectError::unavailable(format!("/proc/diskstats: {e}")))?;
    Ok(parse_diskstats(&content))
}

/// 解析 /proc/diskstats，返回全盘累计读写字节数
///
/// 扇区计数固定按 512 字节算。分区行和所在整盘重复计数，
/// 按名字过滤掉，loop/ram/zram 设备一并跳过。
fn parse_diskstats(content: &str) -> (u64, u64) {
    let mut rows: Vec<(String, u64, u64)> = Vec::new();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2].to_string();
        let sectors_read: u64 = fields[5].parse().unwrap_or(0);
        let sectors_written: u64 = fields[9].parse().unwrap_or(0);
        rows.push((name, sectors_read, sectors_written));
    }

    let names: Vec<String> = rows.iter().map(|(name, _, _)| name.clone()).collect();
    let mut read_bytes = 0u64;
    let mut written_bytes = 0u64;
    for (name, sectors_read, sectors_written) in &rows {
        if name.starts_with("loop") || name.starts_with("ram") || name.starts_with("zram") {
            continue;
        }
        if is_partition(name, &names) {
            continue;
        }
        read_bytes += sectors_read * 512;
        written_bytes += sectors_written * 512;
    }
    (read_bytes, written_bytes)
}

/// sda1 之于 sda、nvme0n1p2 之于 nvme0n1 这类名字视为分区
fn is_partition(name: &str, all: &[String]) -> bool {
    all.iter().any(|candidate| {
        if candidate == name || !name.starts_with(candidate.as_str()) {
            return false;
        }
        let rest = &name[candidate.len()..];
        let digits = rest.strip_prefix('p').unwrap_or(rest);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    })
}

/// systemctl is-active 输出 active 算运行中，其余一律算停了
async fn check_service(name: &str) -> bool {
    let result = tokio::time::timeout(
        SERVICE_TIMEOUT,
        Command::new("systemctl").args(["is-active", name]).output(),
    )
    .await;
    match result {
        Ok(Ok(output)) => String::from_utf8_lossy(&output.stdout).trim() == "active",
        _ => false,
    }
}

async fn check_port(port: u16) -> bool {
    tokio::time::timeout(PORT_TIMEOUT, TcpStream::connect(("127.0.0.1", port)))
        .await
        .map(|result| result.is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISKSTATS_SAMPLE: &str = "\
   8       0 sda 100 0 2048 30 50 0 1024 40 0 70 70
   8       1 sda1 90 0 1024 20 40 0 512 30 0 50 50
 259       0 nvme0n1 10 0 4096 5 5 0 2048 5 0 10 10
 259       1 nvme0n1p1 10 0 4096 5 5 0 2048 5 0 10 10
   7       0 loop0 1 0 8 0 0 0 0 0 0 0 0";

    #[test]
    fn test_parse_diskstats_skips_partitions_and_loop_devices() {
        let (read_bytes, written_bytes) = parse_diskstats(DISKSTATS_SAMPLE);
        assert_eq!(read_bytes, (2048 + 4096) * 512);
        assert_eq!(written_bytes, (1024 + 2048) * 512);
    }

    #[test]
    fn test_parse_diskstats_tolerates_garbage() {
        assert_eq!(parse_diskstats(""), (0, 0));
        assert_eq!(parse_diskstats("not a diskstats line"), (0, 0));
    }

    #[test]
    fn test_is_partition() {
        let names = vec![
            "sda".to_string(),
            "sda1".to_string(),
            "nvme0n1".to_string(),
            "nvme0n1p2".to_string(),
        ];
        assert!(is_partition("sda1", &names));
        assert!(is_partition("nvme0n1p2", &names));
        assert!(!is_partition("sda", &names));
        assert!(!is_partition("nvme0n1", &names));
    }

    #[test]
    fn test_swap_percent_without_swap_is_zero() {
        assert_eq!(swap_percent(0, 0).unwrap(), 0.0);
        assert_eq!(swap_percent(512, 1024).unwrap(), 50.0);
    }

    #[test]
    fn test_memory_percent_guards_zero_total() {
        assert!(memory_percent(100, 0).is_err());
        assert_eq!(memory_percent(250, 1000).unwrap(), 25.0);
    }

    #[tokio::test]
    async fn test_check_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(check_port(port).await);

        drop(listener);
        assert!(!check_port(port).await);
    }

    #[tokio::test]
    async fn test_collect_reads_basic_fields() {
        let partial = LocalCollector.collect(&[], &[]).await;
        let cpu = partial.cpu_percent.expect("cpu reading");
        assert!((0.0..=100.0).contains(&cpu));
        let ram = partial.ram_percent.expect("ram reading");
        assert!((0.0..=100.0).contains(&ram));
        assert!(partial.processes.expect("process count") > 0);
        // 没配置服务和端口就不生成状态表
        assert!(partial.services_status.is_none());
        assert!(partial.ports_status.is_none());
    }
}
