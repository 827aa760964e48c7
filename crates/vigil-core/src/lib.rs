pub mod error;
pub mod model;
pub mod secret;

pub use error::{CoreError, Result};
pub use model::{
    AlertEvent, AlertRule, MetricName, MetricSnapshot, RuleOperator, Severity, SourceMode, Target,
};
pub use secret::CredentialSealer;
