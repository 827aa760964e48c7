pub mod converter;
pub mod entity;

pub use converter::rule_from_model;
pub use entity::{alert_event, alert_rule, metric_snapshot, target};
