//! 目标探测
//!
//! 一轮探测从目标清单开始：先 ICMP 测连通性，再按目标配置
//! 选本机读数、SSH 命令或 SNMP 轮询采集指标，最后把整轮
//! 快照一次性写库。

pub mod error;
pub mod local;
pub mod orchestrator;
pub mod partial;
pub mod ping;
pub mod shell;
pub mod snmp;
pub mod source;

pub use error::{CollectError, FieldResult};
pub use local::{LocalCollector, LocalProbe};
pub use orchestrator::{bounded_fan_out, ProbeConfig, ProbeContext, ProbeOrchestrator};
pub use partial::PartialSnapshot;
pub use ping::{IcmpPinger, ReachabilityProbe};
pub use shell::{ShellCollector, ShellCredentials};
pub use snmp::{CsnmpClient, SnmpClient, SnmpCollector, SnmpValue};
pub use source::{select_source, SourceKind};
