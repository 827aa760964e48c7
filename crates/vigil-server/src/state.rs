use std::sync::Arc;
use vigil_store::{MetricStore, TargetStore};

/// API 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 目标仓库
    pub targets: Arc<TargetStore>,
    /// 快照仓库
    pub metrics: Arc<MetricStore>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(targets: Arc<TargetStore>, metrics: Arc<MetricStore>) -> Self {
        Self { targets, metrics }
    }
}
