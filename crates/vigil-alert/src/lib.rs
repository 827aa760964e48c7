//! 告警评估
//!
//! 周期性把启用规则和各目标的最新快照对一遍，
//! 命中的规则生成事件并广播到通知渠道。

pub mod engine;
pub mod metric_map;

pub use engine::AlertEngine;
pub use metric_map::metric_value;
