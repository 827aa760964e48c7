use vigil_core::{SourceMode, Target};

/// 一个目标实际采用的采集方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// 本机读取
    Local,
    /// SSH 远程执行
    Shell,
    /// SNMP 轮询
    Snmp,
    /// 没有可用方式，只做连通性探测
    Unavailable,
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Shell => "shell",
            SourceKind::Snmp => "snmp",
            SourceKind::Unavailable => "unavailable",
        }
    }
}

/// 根据目标配置选择采集方式，纯函数
///
/// 自动模式的优先级：本机 > Shell > SNMP。
/// 强制 local 但地址不在本机时没有可用方式；
/// 强制 shell/snmp 原样采纳，缺凭据由采集阶段自己失败。
pub fn select_source(target: &Target) -> SourceKind {
    match target.source {
        SourceMode::Local => {
            if target.is_local() {
                SourceKind::Local
            } else {
                SourceKind::Unavailable
            }
        }
        SourceMode::Shell => SourceKind::Shell,
        SourceMode::Snmp => SourceKind::Snmp,
        SourceMode::Auto => {
            if target.is_local() {
                SourceKind::Local
            } else if target.has_shell_credentials() {
                SourceKind::Shell
            } else if target.has_snmp_credentials() {
                SourceKind::Snmp
            } else {
                SourceKind::Unavailable
            }
        }
    }
}
