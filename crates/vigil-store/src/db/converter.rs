use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use vigil_core::{AlertEvent, AlertRule, MetricSnapshot, SourceMode, Target};

/// Target 模型与数据库实体的转换
impl From<Target> for super::target::ActiveModel {
    fn from(target: Target) -> Self {
        Self {
            id: if target.id == 0 { NotSet } else { Set(target.id) },
            hostname: Set(target.hostname),
            address: Set(target.address),
            system_name: Set(target.system_name),
            owner: Set(target.owner),
            environment: Set(target.environment),
            tags: Set(target.tags),
            is_cluster: Set(target.is_cluster),
            source: Set(target.source.as_str().to_string()),
            shell_host: Set(target.shell_host),
            shell_port: Set(target.shell_port as i32),
            shell_username: Set(target.shell_username),
            shell_password_enc: Set(target.shell_password_enc),
            snmp_version: Set(target.snmp_version),
            snmp_community_enc: Set(target.snmp_community_enc),
            monitored_services: Set(strings_to_json(&target.monitored_services)),
            monitored_ports: Set(ports_to_json(&target.monitored_ports)),
            created_at: Set(target.created_at),
        }
    }
}

impl From<super::target::Model> for Target {
    fn from(model: super::target::Model) -> Self {
        Self {
            id: model.id,
            hostname: model.hostname,
            address: model.address,
            system_name: model.system_name,
            owner: model.owner,
            environment: model.environment,
            tags: model.tags,
            is_cluster: model.is_cluster,
            source: SourceMode::from_str(&model.source),
            shell_host: model.shell_host,
            shell_port: model.shell_port as u16,
            shell_username: model.shell_username,
            shell_password_enc: model.shell_password_enc,
            snmp_version: model.snmp_version,
            snmp_community_enc: model.snmp_community_enc,
            monitored_services: json_to_strings(model.monitored_services.as_ref()),
            monitored_ports: json_to_ports(model.monitored_ports.as_ref()),
            created_at: model.created_at,
        }
    }
}

/// MetricSnapshot 模型与数据库实体的转换
impl From<MetricSnapshot> for super::metric_snapshot::ActiveModel {
    fn from(snapshot: MetricSnapshot) -> Self {
        Self {
            id: NotSet,
            target_id: Set(snapshot.target_id),
            captured_at: Set(snapshot.captured_at),
            reachable: Set(snapshot.reachable),
            cpu_percent: Set(snapshot.cpu_percent),
            cpu_temp: Set(snapshot.cpu_temp),
            ram_percent: Set(snapshot.ram_percent),
            swap_percent: Set(snapshot.swap_percent),
            disk_percent: Set(snapshot.disk_percent),
            disk_io_read: Set(snapshot.disk_io_read),
            disk_io_write: Set(snapshot.disk_io_write),
            processes: Set(snapshot.processes),
            network_in_kbps: Set(snapshot.network_in_kbps),
            network_out_kbps: Set(snapshot.network_out_kbps),
            services_status: Set(status_to_json(snapshot.services_status.as_ref())),
            ports_status: Set(status_to_json(snapshot.ports_status.as_ref())),
        }
    }
}

impl From<super::metric_snapshot::Model> for MetricSnapshot {
    fn from(model: super::metric_snapshot::Model) -> Self {
        Self {
            target_id: model.target_id,
            captured_at: model.captured_at,
            reachable: model.reachable,
            cpu_percent: model.cpu_percent,
            cpu_temp: model.cpu_temp,
            ram_percent: model.ram_percent,
            swap_percent: model.swap_percent,
            disk_percent: model.disk_percent,
            disk_io_read: model.disk_io_read,
            disk_io_write: model.disk_io_write,
            processes: model.processes,
            network_in_kbps: model.network_in_kbps,
            network_out_kbps: model.network_out_kbps,
            services_status: json_to_status(model.services_status.as_ref()),
            ports_status: json_to_status(model.ports_status.as_ref()),
        }
    }
}

/// AlertRule 模型与数据库实体的转换
impl From<AlertRule> for super::alert_rule::ActiveModel {
    fn from(rule: AlertRule) -> Self {
        Self {
            id: if rule.id == 0 { NotSet } else { Set(rule.id) },
            name: Set(rule.name),
            target_id: Set(rule.target_id),
            group_id: Set(rule.group_id),
            metric: Set(rule.metric.as_str().to_string()),
            operator: Set(rule.operator.as_str().to_string()),
            threshold: Set(rule.threshold),
            severity: Set(rule.severity.as_str().to_string()),
            enabled: Set(rule.enabled),
            created_at: Set(rule.created_at),
        }
    }
}

/// 规则实体转领域模型
///
/// 指标名和操作符是封闭枚举，库里存了认不出的值时返回 None，
/// 跳过处理由上层决定。
pub fn rule_from_model(model: super::alert_rule::Model) -> Option<AlertRule> {
    let metric = vigil_core::MetricName::from_str(&model.metric)?;
    let operator = vigil_core::RuleOperator::from_str(&model.operator)?;
    Some(AlertRule {
        id: model.id,
        name: model.name,
        target_id: model.target_id,
        group_id: model.group_id,
        metric,
        operator,
        threshold: model.threshold,
        severity: vigil_core::Severity::from_str(&model.severity),
        enabled: model.enabled,
        created_at: model.created_at,
    })
}

/// AlertEvent 模型与数据库实体的转换
impl From<AlertEvent> for super::alert_event::ActiveModel {
    fn from(event: AlertEvent) -> Self {
        Self {
            id: if event.id == 0 { NotSet } else { Set(event.id) },
            rule_id: Set(event.rule_id),
            target_id: Set(event.target_id),
            triggered_at: Set(event.triggered_at),
            value: Set(event.value),
            message: Set(event.message),
        }
    }
}

impl From<super::alert_event::Model> for AlertEvent {
    fn from(model: super::alert_event::Model) -> Self {
        Self {
            id: model.id,
            rule_id: model.rule_id,
            target_id: model.target_id,
            triggered_at: model.triggered_at,
            value: model.value,
            message: model.message,
        }
    }
}

// ========== 辅助函数 ==========

/// 将字符串列表转换为 JSON
fn strings_to_json(items: &[String]) -> Option<JsonValue> {
    if items.is_empty() {
        None
    } else {
        serde_json::to_value(items).ok()
    }
}

/// 将 JSON 转换为字符串列表
fn json_to_strings(json: Option<&JsonValue>) -> Vec<String> {
    json.and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// 将端口列表转换为 JSON
fn ports_to_json(ports: &[u16]) -> Option<JsonValue> {
    if ports.is_empty() {
        None
    } else {
        serde_json::to_value(ports).ok()
    }
}

/// 将 JSON 转换为端口列表
fn json_to_ports(json: Option<&JsonValue>) -> Vec<u16> {
    json.and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// 将状态表转换为 JSON
fn status_to_json(status: Option<&HashMap<String, bool>>) -> Option<JsonValue> {
    status.and_then(|map| serde_json::to_value(map).ok())
}

/// 将 JSON 转换为状态表
fn json_to_status(json: Option<&JsonValue>) -> Option<HashMap<String, bool>> {
    json.and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{MetricName, RuleOperator, Severity};

    #[test]
    fn test_target_conversion_round_trip() {
        let mut target = Target::new("web-01", "10.0.0.5");
        target.monitored_services = vec!["nginx".to_string(), "redis".to_string()];
        target.monitored_ports = vec![80, 443];
        target.source = SourceMode::Shell;

        let active: crate::db::target::ActiveModel = target.clone().into();
        assert_eq!(active.hostname.clone().unwrap(), "web-01");
        assert_eq!(active.source.clone().unwrap(), "shell");
        assert!(active.monitored_services.clone().unwrap().is_some());

        let model = crate::db::target::Model {
            id: 3,
            hostname: target.hostname.clone(),
            address: target.address.clone(),
            system_name: None,
            owner: Some("运维组".to_string()),
            environment: "prod".to_string(),
            tags: None,
            is_cluster: false,
            source: "shell".to_string(),
            shell_host: Some("10.0.0.5".to_string()),
            shell_port: 22,
            shell_username: Some("monitor".to_string()),
            shell_password_enc: None,
            snmp_version: None,
            snmp_community_enc: None,
            monitored_services: serde_json::to_value(&target.monitored_services).ok(),
            monitored_ports: serde_json::to_value(&target.monitored_ports).ok(),
            created_at: target.created_at,
        };
        let back: Target = model.into();
        assert_eq!(back.id, 3);
        assert_eq!(back.source, SourceMode::Shell);
        assert_eq!(back.monitored_services, vec!["nginx", "redis"]);
        assert_eq!(back.monitored_ports, vec![80, 443]);
    }

    #[test]
    fn test_target_bad_json_falls_back_to_empty() {
        let model = crate::db::target::Model {
            id: 1,
            hostname: "web-01".to_string(),
            address: "10.0.0.5".to_string(),
            system_name: None,
            owner: None,
            environment: "prod".to_string(),
            tags: None,
            is_cluster: false,
            source: "auto".to_string(),
            shell_host: None,
            shell_port: 22,
            shell_username: None,
            shell_password_enc: None,
            snmp_version: None,
            snmp_community_enc: None,
            monitored_services: Some(serde_json::json!({"not": "a list"})),
            monitored_ports: Some(serde_json::json!("80,443")),
            created_at: chrono::Utc::now(),
        };
        let target: Target = model.into();
        assert!(target.monitored_services.is_empty());
        assert!(target.monitored_ports.is_empty());
    }

    #[test]
    fn test_snapshot_conversion_keeps_missing_fields() {
        let mut snapshot = MetricSnapshot::new(5);
        snapshot.cpu_percent = Some(42.5);
        snapshot.services_status =
            Some(HashMap::from([("nginx".to_string(), true)]));

        let active: crate::db::metric_snapshot::ActiveModel = snapshot.clone().into();
        assert_eq!(active.cpu_percent.clone().unwrap(), Some(42.5));
        assert_eq!(active.ram_percent.clone().unwrap(), None);
        assert!(active.services_status.clone().unwrap().is_some());
        assert!(active.ports_status.clone().unwrap().is_none());
    }

    #[test]
    fn test_rule_from_model_skips_unknown_metric() {
        let model = crate::db::alert_rule::Model {
            id: 1,
            name: "CPU 过高".to_string(),
            target_id: Some(2),
            group_id: None,
            metric: "uptime".to_string(),
            operator: ">".to_string(),
            threshold: Some(90.0),
            severity: "warning".to_string(),
            enabled: true,
            created_at: chrono::Utc::now(),
        };
        assert!(rule_from_model(model).is_none());
    }

    #[test]
    fn test_rule_from_model_parses_known_fields() {
        let model = crate::db::alert_rule::Model {
            id: 7,
            name: "CPU 过高".to_string(),
            target_id: Some(2),
            group_id: None,
            metric: "cpu".to_string(),
            operator: ">".to_string(),
            threshold: Some(90.0),
            severity: "critical".to_string(),
            enabled: true,
            created_at: chrono::Utc::now(),
        };
        let rule = rule_from_model(model).unwrap();
        assert_eq!(rule.metric, MetricName::Cpu);
        assert_eq!(rule.operator, RuleOperator::GreaterThan);
        assert_eq!(rule.severity, Severity::Critical);
    }
}
