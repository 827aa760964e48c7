use crate::error::FieldResult;
use std::collections::HashMap;
use tracing::debug;
use vigil_core::MetricSnapshot;

/// 局部采集结果
///
/// 收集器拿到什么填什么，缺的保持 None。
/// 缺失与 0 含义不同，合并时不得互相替代。
#[derive(Debug, Default, Clone)]
pub struct PartialSnapshot {
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
    pub services_status: Option<HashMap<String, bool>>,
    pub ports_status: Option<HashMap<String, bool>>,
}

impl PartialSnapshot {
    /// 是否一个字段都没采到
    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none()
            && self.cpu_temp.is_none()
            && self.ram_percent.is_none()
            && self.swap_percent.is_none()
            && self.disk_percent.is_none()
            && self.disk_io_read.is_none()
            && self.disk_io_write.is_none()
            && self.processes.is_none()
            && self.network_in_kbps.is_none()
            && self.network_out_kbps.is_none()
            && self.services_status.is_none()
            && self.ports_status.is_none()
    }

    /// 把局部结果写进快照，只覆盖采到的字段
    pub fn apply_to(self, snapshot: &mut MetricSnapshot) {
        if let Some(v) = self.cpu_percent {
            snapshot.cpu_percent = Some(v);
        }
        if let Some(v) = self.cpu_temp {
            snapshot.cpu_temp = Some(v);
        }
        if let Some(v) = self.ram_percent {
            snapshot.ram_percent = Some(v);
        }
        if let Some(v) = self.swap_percent {
            snapshot.swap_percent = Some(v);
        }
        if let Some(v) = self.disk_percent {
            snapshot.disk_percent = Some(v);
        }
        if let Some(v) = self.disk_io_read {
            snapshot.disk_io_read = Some(v);
        }
        if let Some(v) = self.disk_io_write {
            snapshot.disk_io_write = Some(v);
        }
        if let Some(v) = self.processes {
            snapshot.processes = Some(v);
        }
        if let Some(v) = self.network_in_kbps {
            snapshot.network_in_kbps = Some(v);
        }
        if let Some(v) = self.network_out_kbps {
            snapshot.network_out_kbps = Some(v);
        }
        if let Some(v) = self.services_status {
            snapshot.services_status = Some(v);
        }
        if let Some(v) = self.ports_status {
            snapshot.ports_status = Some(v);
        }
    }
}

/// 把单项采集结果并入槽位
///
/// 成功写入，失败记一条日志后丢弃，错误到此为止。
pub fn merge_into<T>(slot: &mut Option<T>, field: &'static str, result: FieldResult<T>) {
    match result {
        Ok(value) => *slot = Some(value),
        Err(e) => debug!(field, error = %e, "Metric collection failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectError;

    #[test]
    fn test_merge_into_keeps_slot_on_error() {
        let mut slot: Option<f64> = None;
        merge_into(&mut slot, "cpu_percent", Err(CollectError::parse("bad")));
        assert!(slot.is_none());

        merge_into(&mut slot, "cpu_percent", Ok(42.0));
        assert_eq!(slot, Some(42.0));

        // 后续失败不清掉已有值
        merge_into(&mut slot, "cpu_percent", Err(CollectError::parse("bad")));
        assert_eq!(slot, Some(42.0));
    }

    #[test]
    fn test_apply_to_leaves_missing_fields_untouched() {
        let partial = PartialSnapshot {
            cpu_percent: Some(50.0),
            ram_percent: Some(60.0),
            ..Default::default()
        };
        let mut snapshot = MetricSnapshot::new(1);
        partial.apply_to(&mut snapshot);

        assert_eq!(snapshot.cpu_percent, Some(50.0));
        assert_eq!(snapshot.ram_percent, Some(60.0));
        assert!(snapshot.disk_percent.is_none());
        assert!(snapshot.processes.is_none());
    }

    #[test]
    fn test_is_empty() {
        assert!(PartialSnapshot::default().is_empty());
        let partial = PartialSnapshot {
            processes: Some(10),
            ..Default::default()
        };
        assert!(!partial.is_empty());
    }
}
