pub mod db;
pub mod error;
pub mod events;
pub mod metrics;
pub mod rules;
pub mod schema;
pub mod targets;

pub use db::{alert_event, alert_rule, metric_snapshot, target};
pub use error::{Result, StoreError};
pub use events::EventStore;
pub use metrics::MetricStore;
pub use rules::RuleStore;
pub use schema::ensure_schema;
pub use targets::TargetStore;
