use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 采集来源偏好
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceMode {
    /// 自动选择
    Auto,
    /// 本机采集
    Local,
    /// 远程 Shell
    Shell,
    /// 管理协议（SNMP）
    Snmp,
}

impl SourceMode {
    pub fn as_str(&self) -> &str {
        match self {
            SourceMode::Auto => "auto",
            SourceMode::Local => "local",
            SourceMode::Shell => "shell",
            SourceMode::Snmp => "snmp",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "local" => SourceMode::Local,
            "shell" => SourceMode::Shell,
            "snmp" => SourceMode::Snmp,
            _ => SourceMode::Auto,
        }
    }
}

/// 监控目标
///
/// 由管理层负责增删改，本系统只读。
/// 凭据字段保存加密密文，仅在采集瞬间解密。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// 目标 ID
    pub id: i64,

    /// 主机名
    pub hostname: String,

    /// 网络地址（IP 或可解析主机名）
    pub address: String,

    /// 系统名称
    pub system_name: Option<String>,

    /// 负责人
    pub owner: Option<String>,

    /// 环境（test|stage|prod）
    pub environment: String,

    /// 标签
    pub tags: Option<String>,

    /// 是否集群节点
    pub is_cluster: bool,

    /// 采集来源偏好
    pub source: SourceMode,

    /// Shell 主机（缺省时退回 address）
    pub shell_host: Option<String>,

    /// Shell 端口
    pub shell_port: u16,

    /// Shell 用户名
    pub shell_username: Option<String>,

    /// Shell 口令（密文）
    pub shell_password_enc: Option<String>,

    /// SNMP 版本（当前只认 v2c）
    pub snmp_version: Option<String>,

    /// SNMP community（密文）
    pub snmp_community_enc: Option<String>,

    /// 要检查的服务名列表
    pub monitored_services: Vec<String>,

    /// 要检查的 TCP 端口列表
    pub monitored_ports: Vec<u16>,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Target {
    /// 创建新目标（测试与管理层使用）
    pub fn new(hostname: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: 0,
            hostname: hostname.into(),
            address: address.into(),
            system_name: None,
            owner: None,
            environment: "prod".to_string(),
            tags: None,
            is_cluster: false,
            source: SourceMode::Auto,
            shell_host: None,
            shell_port: 22,
            shell_username: None,
            shell_password_enc: None,
            snmp_version: None,
            snmp_community_enc: None,
            monitored_services: Vec::new(),
            monitored_ports: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// 地址是否指向本机
    pub fn is_local(&self) -> bool {
        matches!(self.address.as_str(), "127.0.0.1" | "::1" | "localhost")
            || self.hostname == "localhost"
    }

    /// 是否配置了 Shell 凭据
    pub fn has_shell_credentials(&self) -> bool {
        self.shell_host.is_some() && self.shell_username.is_some()
    }

    /// 是否配置了 SNMP 凭据
    pub fn has_snmp_credentials(&self) -> bool {
        self.snmp_version.as_deref() == Some("v2c")
            && self.snmp_community_enc.is_some()
            && !self.address.is_empty()
    }
}

/// 指标快照
///
/// 一个目标在一个采集周期内的全部读数。字段缺失表示该项没有采到，
/// 与数值 0 含义不同，任何环节都不得把缺失补成 0。
/// 创建后不再修改，只被保留策略删除。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSnapshot {
    /// 目标 ID
    pub target_id: i64,

    /// 采集时间
    pub captured_at: DateTime<Utc>,

    /// 连通性（ICMP 探测结果）
    pub reachable: Option<bool>,

    /// CPU 使用率（%）
    pub cpu_percent: Option<f64>,

    /// CPU 温度（摄氏度）
    pub cpu_temp: Option<f64>,

    /// 内存使用率（%）
    pub ram_percent: Option<f64>,

    /// 交换区使用率（%）
    pub swap_percent: Option<f64>,

    /// 磁盘使用率（%）
    pub disk_percent: Option<f64>,

    /// 磁盘读速率（MB/s）
    pub disk_io_read: Option<f64>,

    /// 磁盘写速率（MB/s）
    pub disk_io_write: Option<f64>,

    /// 进程数
    pub processes: Option<i64>,

    /// 网络入流量（kbps）
    pub network_in_kbps: Option<f64>,

    /// 网络出流量（kbps）
    pub network_out_kbps: Option<f64>,

    /// 服务状态（服务名 -> 是否运行）
    pub services_status: Option<HashMap<String, bool>>,

    /// 端口状态（端口 -> 是否可连）
    pub ports_status: Option<HashMap<String, bool>>,
}

impl MetricSnapshot {
    /// 创建空快照，所有指标字段均缺失
    pub fn new(target_id: i64) -> Self {
        Self {
            target_id,
            captured_at: Utc::now(),
            reachable: None,
            cpu_percent: None,
            cpu_temp: None,
            ram_percent: None,
            swap_percent: None,
            disk_percent: None,
            disk_io_read: None,
            disk_io_write: None,
            processes: None,
            network_in_kbps: None,
            network_out_kbps: None,
            services_status: None,
            ports_status: None,
        }
    }

    /// 合成网络吞吐（MB/s），缺失的方向按 0 计，保留两位小数
    pub fn combined_network_io(&self) -> f64 {
        let total =
            self.network_in_kbps.unwrap_or(0.0) + self.network_out_kbps.unwrap_or(0.0);
        ((total / 1024.0) * 100.0).round() / 100.0
    }

    /// 合成磁盘吞吐（MB/s），缺失的方向按 0 计
    pub fn combined_disk_io(&self) -> f64 {
        self.disk_io_read.unwrap_or(0.0) + self.disk_io_write.unwrap_or(0.0)
    }
}

/// 告警指标名（封闭枚举，与快照字段一一对应）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MetricName {
    Cpu,
    CpuTemp,
    Ram,
    Swap,
    Disk,
    DiskIo,
    Processes,
    NetIn,
    NetOut,
    NetworkIo,
    Reachable,
}

impl MetricName {
    pub fn as_str(&self) -> &str {
        match self {
            MetricName::Cpu => "cpu",
            MetricName::CpuTemp => "cpu_temp",
            MetricName::Ram => "ram",
            MetricName::Swap => "swap",
            MetricName::Disk => "disk",
            MetricName::DiskIo => "disk_io",
            MetricName::Processes => "processes",
            MetricName::NetIn => "net_in",
            MetricName::NetOut => "net_out",
            MetricName::NetworkIo => "network_io",
            MetricName::Reachable => "reachable",
        }
    }

    /// 解析指标名，未知名字返回 None
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cpu" => Some(MetricName::Cpu),
            "cpu_temp" => Some(MetricName::CpuTemp),
            "ram" => Some(MetricName::Ram),
            "swap" => Some(MetricName::Swap),
            "disk" => Some(MetricName::Disk),
            "disk_io" => Some(MetricName::DiskIo),
            "processes" => Some(MetricName::Processes),
            "net_in" => Some(MetricName::NetIn),
            "net_out" => Some(MetricName::NetOut),
            "network_io" => Some(MetricName::NetworkIo),
            "reachable" => Some(MetricName::Reachable),
            _ => None,
        }
    }
}

/// 比较操作符
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RuleOperator {
    GreaterThan,
    LessThan,
    Equal,
    NotEqual,
}

impl RuleOperator {
    pub fn as_str(&self) -> &str {
        match self {
            RuleOperator::GreaterThan => ">",
            RuleOperator::LessThan => "<",
            RuleOperator::Equal => "=",
            RuleOperator::NotEqual => "!=",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            ">" => Some(RuleOperator::GreaterThan),
            "<" => Some(RuleOperator::LessThan),
            "=" => Some(RuleOperator::Equal),
            "!=" => Some(RuleOperator::NotEqual),
            _ => None,
        }
    }

    /// 阈值比较。等值判断是精确比较，不带容差；
    /// reachable 的 1.0/0.0 编码依赖这一点。
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            RuleOperator::GreaterThan => value > threshold,
            RuleOperator::LessThan => value < threshold,
            RuleOperator::Equal => value == threshold,
            RuleOperator::NotEqual => value != threshold,
        }
    }
}

/// 告警级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "info" => Severity::Info,
            "critical" => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

/// 告警规则
///
/// 由管理层维护；group_id 仅存储，按组展开在管理层完成，
/// 引擎只评估带 target_id 的规则。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    /// 规则 ID
    pub id: i64,

    /// 规则名称
    pub name: String,

    /// 目标 ID
    pub target_id: Option<i64>,

    /// 告警组 ID
    pub group_id: Option<i64>,

    /// 指标名
    pub metric: MetricName,

    /// 比较操作符
    pub operator: RuleOperator,

    /// 阈值
    pub threshold: Option<f64>,

    /// 级别
    pub severity: Severity,

    /// 是否启用
    pub enabled: bool,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 告警事件
///
/// 规则命中一次记录一条，只追加不修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    /// 事件 ID
    pub id: i64,

    /// 规则 ID
    pub rule_id: i64,

    /// 目标 ID
    pub target_id: Option<i64>,

    /// 触发时间
    pub triggered_at: DateTime<Utc>,

    /// 命中时的观测值
    pub value: Option<f64>,

    /// 渲染后的消息
    pub message: String,
}

impl AlertEvent {
    pub fn new(
        rule_id: i64,
        target_id: Option<i64>,
        value: Option<f64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            rule_id,
            target_id,
            triggered_at: Utc::now(),
            value,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_mode_round_trip() {
        for mode in [
            SourceMode::Auto,
            SourceMode::Local,
            SourceMode::Shell,
            SourceMode::Snmp,
        ] {
            assert_eq!(SourceMode::from_str(mode.as_str()), mode);
        }
        // 未知值回落到 auto
        assert_eq!(SourceMode::from_str("telnet"), SourceMode::Auto);
    }

    #[test]
    fn test_target_is_local() {
        assert!(Target::new("web-01", "127.0.0.1").is_local());
        assert!(Target::new("web-01", "::1").is_local());
        assert!(Target::new("web-01", "localhost").is_local());
        assert!(Target::new("localhost", "10.0.0.5").is_local());
        assert!(!Target::new("web-01", "10.0.0.5").is_local());
    }

    #[test]
    fn test_metric_name_parse() {
        assert_eq!(MetricName::from_str("cpu"), Some(MetricName::Cpu));
        assert_eq!(MetricName::from_str("network_io"), Some(MetricName::NetworkIo));
        assert_eq!(MetricName::from_str("uptime"), None);
        assert_eq!(MetricName::Reachable.as_str(), "reachable");
    }

    #[test]
    fn test_operator_compare_is_strict() {
        let gt = RuleOperator::from_str(">").unwrap();
        assert!(gt.compare(95.0, 90.0));
        assert!(!gt.compare(90.0, 90.0));

        let eq = RuleOperator::from_str("=").unwrap();
        assert!(eq.compare(1.0, 1.0));
        assert!(!eq.compare(1.0000001, 1.0));

        let ne = RuleOperator::from_str("!=").unwrap();
        assert!(ne.compare(0.0, 1.0));
        assert!(!ne.compare(1.0, 1.0));

        assert_eq!(RuleOperator::from_str(">="), None);
    }

    #[test]
    fn test_combined_network_io() {
        let mut snapshot = MetricSnapshot::new(1);
        snapshot.network_in_kbps = Some(1024.0);
        snapshot.network_out_kbps = Some(2048.0);
        assert_eq!(snapshot.combined_network_io(), 3.0);

        // 缺失方向按 0 计
        snapshot.network_out_kbps = None;
        assert_eq!(snapshot.combined_network_io(), 1.0);
    }

    #[test]
    fn test_combined_disk_io() {
        let mut snapshot = MetricSnapshot::new(1);
        snapshot.disk_io_read = Some(12.5);
        assert_eq!(snapshot.combined_disk_io(), 12.5);
        snapshot.disk_io_write = Some(2.5);
        assert_eq!(snapshot.combined_disk_io(), 15.0);
    }

    #[test]
    fn test_empty_snapshot_has_no_fields() {
        let snapshot = MetricSnapshot::new(7);
        assert_eq!(snapshot.target_id, 7);
        assert!(snapshot.reachable.is_none());
        assert!(snapshot.cpu_percent.is_none());
        assert!(snapshot.processes.is_none());
        assert!(snapshot.services_status.is_none());
    }

    #[test]
    fn test_severity_default_is_warning() {
        assert_eq!(Severity::from_str("info"), Severity::Info);
        assert_eq!(Severity::from_str("严重"), Severity::Warning);
    }
}
