use crate::local::{LocalCollector, LocalProbe};
use crate::partial::PartialSnapshot;
use crate::ping::{IcmpPinger, ReachabilityProbe};
use crate::shell::{ShellCollector, ShellCredentials};
use crate::snmp::SnmpCollector;
use crate::source::{select_source, SourceKind};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use vigil_core::model::{MetricSnapshot, Target};
use vigil_core::secret::CredentialSealer;
use vigil_store::error::Result as StoreResult;
use vigil_store::metrics::MetricStore;
use vigil_store::targets::TargetStore;

/// 探测参数
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// 同时在飞的探测数上限
    pub max_concurrency: usize,
    /// 单个目标的采集总时限
    pub probe_deadline: Duration,
    pub ping_timeout: Duration,
    pub shell_timeout: Duration,
    pub snmp_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            probe_deadline: Duration::from_secs(45),
            ping_timeout: Duration::from_secs(3),
            shell_timeout: Duration::from_secs(10),
            snmp_timeout: Duration::from_secs(5),
        }
    }
}

/// 单目标探测所需的全部依赖
pub struct ProbeContext {
    config: ProbeConfig,
    sealer: CredentialSealer,
    pinger: Arc<dyn ReachabilityProbe>,
    local: Arc<dyn LocalProbe>,
    shell: ShellCollector,
    snmp: SnmpCollector,
}

impl ProbeContext {
    pub fn new(config: ProbeConfig, sealer: CredentialSealer) -> Self {
        let shell = ShellCollector::new(config.shell_timeout);
        let snmp = SnmpCollector::new(config.snmp_timeout);
        Self {
            sealer,
            pinger: Arc::new(IcmpPinger),
            local: Arc::new(LocalCollector),
            shell,
            snmp,
            config,
        }
    }

    pub fn with_pinger(mut self, pinger: Arc<dyn ReachabilityProbe>) -> Self {
        self.pinger = pinger;
        self
    }

    pub fn with_local_probe(mut self, local: Arc<dyn LocalProbe>) -> Self {
        self.local = local;
        self
    }

    /// 探测单个目标，无论成败总会返回一份快照
    ///
    /// 先测连通性，再按选定方式采集。采集超出总时限时
    /// 丢弃读数，快照里只留连通性。
    pub async fn probe_target(&self, target: &Target) -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::new(target.id);

        let reachable = self
            .pinger
            .check(&target.address, self.config.ping_timeout)
            .await;
        snapshot.reachable = Some(reachable);

        let source = select_source(target);
        debug!(
            target_id = target.id,
            hostname = %target.hostname,
            source = source.as_str(),
            reachable,
            "Probing target"
        );

        match tokio::time::timeout(self.config.probe_deadline, self.collect(target, source)).await
        {
            Ok(partial) => partial.apply_to(&mut snapshot),
            Err(_) => {
                warn!(
                    target_id = target.id,
                    hostname = %target.hostname,
                    "Probe deadline exceeded"
                );
            }
        }
        snapshot
    }

    async fn collect(&self, target: &Target, source: SourceKind) -> PartialSnapshot {
        match source {
            SourceKind::Local => {
                self.local
                    .collect(&target.monitored_services, &target.monitored_ports)
                    .await
            }
            SourceKind::Shell => match self.shell_credentials(target) {
                Some(credentials) => self.shell.collect(credentials).await,
                None => PartialSnapshot::default(),
            },
            SourceKind::Snmp => {
                let community = self.snmp_community(target);
                self.snmp.collect(&target.address, &community).await
            }
            SourceKind::Unavailable => {
                debug!(target_id = target.id, "No collection source for target");
                PartialSnapshot::default()
            }
        }
    }

    fn shell_credentials(&self, target: &Target) -> Option<ShellCredentials> {
        let host = target.shell_host.clone()?;
        let username = target.shell_username.clone()?;
        let password = target
            .shell_password_enc
            .as_deref()
            .map(|token| self.sealer.open(token))
            .unwrap_or_default();
        Some(ShellCredentials {
            host,
            port: target.shell_port,
            username,
            password,
        })
    }

    /// community 未配置按 public，坏密文解出来就是空串
    fn snmp_community(&self, target: &Target) -> String {
        match target.snmp_community_enc.as_deref() {
            Some(token) if !token.is_empty() => self.sealer.open(token),
            _ => "public".to_string(),
        }
    }
}

/// 信号量限流的批量执行
///
/// future 创建后攒在任务里，拿到许可才开始跑。
/// 单个任务 join 失败只记日志，不影响其余结果。
pub async fn bounded_fan_out<T, R, F, Fut>(items: Vec<T>, concurrency: usize, work: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(items.len());

    for item in items {
        let semaphore = semaphore.clone();
        let future = work(item);
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closes");
            future.await
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(result) => results.push(result),
            Err(e) => {
                error!(error = %e, "Probe task join error");
            }
        }
    }
    results
}

/// 整轮探测的编排器
pub struct ProbeOrchestrator {
    context: Arc<ProbeContext>,
    targets: TargetStore,
    metrics: MetricStore,
}

impl ProbeOrchestrator {
    pub fn new(context: Arc<ProbeContext>, targets: TargetStore, metrics: MetricStore) -> Self {
        Self {
            context,
            targets,
            metrics,
        }
    }

    /// 跑一轮探测，返回写库的快照数
    ///
    /// 所有目标探完后一次性批量写入，写库失败整轮作废。
    pub async fn run_cycle(&self) -> StoreResult<usize> {
        let cycle_id = Uuid::new_v4();
        let targets = self.targets.list().await?;
        if targets.is_empty() {
            debug!(cycle = %cycle_id, "No targets to probe");
            return Ok(0);
        }

        let started = Instant::now();
        info!(
            cycle = %cycle_id,
            targets = targets.len(),
            concurrency = self.context.config.max_concurrency,
            "Starting probe cycle"
        );

        let context = self.context.clone();
        let snapshots = bounded_fan_out(
            targets,
            self.context.config.max_concurrency,
            move |target| {
                let context = context.clone();
                async move { context.probe_target(&target).await }
            },
        )
        .await;

        let written = snapshots.len();
        self.metrics.append_batch(snapshots).await?;

        info!(
            cycle = %cycle_id,
            snapshots = written,
            duration_ms = started.elapsed().as_millis() as i64,
            "Probe cycle completed"
        );
        Ok(written)
    }
}
