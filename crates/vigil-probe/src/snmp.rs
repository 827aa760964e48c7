use crate::error::{CollectError, FieldResult};
use crate::partial::{merge_into, PartialSnapshot};
use async_trait::async_trait;
use csnmp::{ObjectIdentifier, ObjectValue, Snmp2cClient};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{debug, warn};

/// hrSystemProcesses
const HR_SYSTEM_PROCESSES: &str = "1.3.6.1.2.1.25.1.6.0";
/// hrProcessorLoad，每核一行
const HR_PROCESSOR_LOAD: &str = "1.3.6.1.2.1.25.3.3.1.2";
/// hrStorageType
const HR_STORAGE_TYPE: &str = "1.3.6.1.2.1.25.2.3.1.2";
/// hrStorageAllocationUnits
const HR_STORAGE_ALLOCATION_UNITS: &str = "1.3.6.1.2.1.25.2.3.1.4";
/// hrStorageSize
const HR_STORAGE_SIZE: &str = "1.3.6.1.2.1.25.2.3.1.5";
/// hrStorageUsed
const HR_STORAGE_USED: &str = "1.3.6.1.2.1.25.2.3.1.6";
/// hrStorageRam
const STORAGE_TYPE_RAM: &str = "1.3.6.1.2.1.25.2.1.2";
/// hrStorageFixedDisk
const STORAGE_TYPE_FIXED_DISK: &str = "1.3.6.1.2.1.25.2.1.4";

const SNMP_PORT: u16 = 161;
const MAX_REPETITIONS: u32 = 10;

/// 采集用得上的值类型，其余一律折叠成 Other
#[derive(Debug, Clone, PartialEq)]
pub enum SnmpValue {
    Integer(i64),
    Counter(u64),
    OctetString(String),
    ObjectId(String),
    Other,
}

impl SnmpValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(v) => Some(*v),
            SnmpValue::Counter(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&str> {
        match self {
            SnmpValue::ObjectId(v) => Some(v),
            _ => None,
        }
    }
}

/// SNMP 会话接口，测试用假客户端替换
#[async_trait]
pub trait SnmpClient: Send + Sync {
    async fn get(&self, oid: &str) -> FieldResult<SnmpValue>;

    /// 子树遍历，返回 (完整 OID, 值) 列表
    async fn walk(&self, oid: &str) -> FieldResult<Vec<(String, SnmpValue)>>;
}

/// 基于 UDP 的 v2c 客户端
pub struct CsnmpClient {
    inner: Snmp2cClient,
}

impl CsnmpClient {
    pub async fn connect(address: &str, community: &str, timeout: Duration) -> FieldResult<Self> {
        let target = resolve_target(address).await?;
        let bind: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16, 0, 0, 0, 0, 0, 0, 0], 0))
        };
        let inner = Snmp2cClient::new(
            target,
            community.as_bytes().to_vec(),
            Some(bind),
            Some(timeout),
        )
        .await
        .map_err(|e| CollectError::transport(e.to_string()))?;
        Ok(Self { inner })
    }
}

/// 地址不带端口时补默认 161
async fn resolve_target(address: &str) -> FieldResult<SocketAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, SNMP_PORT));
    }
    let candidate = if address.contains(':') {
        address.to_string()
    } else {
        format!("{address}:{SNMP_PORT}")
    };
    let resolved = tokio::net::lookup_host(candidate.as_str())
        .await?
        .next()
        .ok_or_else(|| CollectError::transport(format!("cannot resolve {candidate}")));
    resolved
}

#[async_trait]
impl SnmpClient for CsnmpClient {
    async fn get(&self, oid: &str) -> FieldResult<SnmpValue> {
        let parsed: ObjectIdentifier = oid
            .parse()
            .map_err(|_| CollectError::parse(format!("bad oid {oid}")))?;
        let value = self
            .inner
            .get(parsed)
            .await
            .map_err(|e| CollectError::transport(e.to_string()))?;
        Ok(convert_value(value))
    }

    async fn walk(&self, oid: &str) -> FieldResult<Vec<(String, SnmpValue)>> {
        let parsed: ObjectIdentifier = oid
            .parse()
            .map_err(|_| CollectError::parse(format!("bad oid {oid}")))?;
        let rows = self
            .inner
            .walk_bulk(parsed, MAX_REPETITIONS)
            .await
            .map_err(|e| CollectError::transport(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|(key, value)| (key.to_string(), convert_value(value)))
            .collect())
    }
}

fn convert_value(value: ObjectValue) -> SnmpValue {
    match value {
        ObjectValue::Integer(v) => SnmpValue::Integer(v as i64),
        ObjectValue::Counter32(v) | ObjectValue::Unsigned32(v) | ObjectValue::TimeTicks(v) => {
            SnmpValue::Counter(v as u64)
        }
        ObjectValue::Counter64(v) => SnmpValue::Counter(v),
        ObjectValue::String(bytes) => {
            SnmpValue::OctetString(String::from_utf8_lossy(&bytes).into_owned())
        }
        ObjectValue::ObjectId(oid) => SnmpValue::ObjectId(oid.to_string()),
        _ => SnmpValue::Other,
    }
}

/// 通过 SNMP 轮询主机资源表的采集器
pub struct SnmpCollector {
    timeout: Duration,
}

impl SnmpCollector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn collect(&self, address: &str, community: &str) -> PartialSnapshot {
        match CsnmpClient::connect(address, community, self.timeout).await {
            Ok(client) => poll_with_client(&client).await,
            Err(e) => {
                warn!(address = %address, error = %e, "SNMP session failed");
                PartialSnapshot::default()
            }
        }
    }
}

/// 单次轮询，客户端由调用方提供
pub async fn poll_with_client(client: &dyn SnmpClient) -> PartialSnapshot {
    let mut partial = PartialSnapshot::default();
    merge_into(
        &mut partial.processes,
        "processes",
        scalar_count(client, HR_SYSTEM_PROCESSES).await,
    );
    merge_into(
        &mut partial.cpu_percent,
        "cpu_percent",
        processor_load(client).await,
    );

    let table = walk_storage_table(client).await;
    merge_into(&mut partial.ram_percent, "ram_percent", table.ram_percent());
    merge_into(&mut partial.disk_percent, "disk_percent", table.disk_percent());
    partial
}

async fn scalar_count(client: &dyn SnmpClient, oid: &str) -> FieldResult<i64> {
    let value = client.get(oid).await?;
    value
        .as_i64()
        .ok_or_else(|| CollectError::parse(format!("unexpected value type for {oid}")))
}

/// 每核负载取平均
async fn processor_load(client: &dyn SnmpClient) -> FieldResult<f64> {
    let rows = client.walk(HR_PROCESSOR_LOAD).await?;
    let loads: Vec<f64> = rows
        .iter()
        .filter_map(|(_oid, value)| value.as_i64())
        .map(|v| v as f64)
        .collect();
    if loads.is_empty() {
        return Err(CollectError::unavailable("no processor load rows"));
    }
    Ok(loads.iter().sum::<f64>() / loads.len() as f64)
}

/// hrStorage 表按行号聚合的中间结果
#[derive(Debug, Default)]
pub struct StorageTable {
    rows: BTreeMap<String, StorageRow>,
}

#[derive(Debug, Default)]
struct StorageRow {
    storage_type: Option<String>,
    allocation_units: Option<i64>,
    size: Option<i64>,
    used: Option<i64>,
}

impl StorageTable {
    fn row(&mut self, suffix: &str) -> &mut StorageRow {
        self.rows.entry(suffix.to_string()).or_default()
    }

    /// 第一个 RAM 类型的行定内存使用率
    fn ram_percent(&self) -> FieldResult<f64> {
        for row in self.rows.values() {
            let is_ram = row
                .storage_type
                .as_deref()
                .map(|t| t.ends_with(STORAGE_TYPE_RAM))
                .unwrap_or(false);
            if !is_ram {
                continue;
            }
            let size = row.size.unwrap_or(0);
            let used = row.used.unwrap_or(0);
            if size > 0 {
                return Ok(used as f64 / size as f64 * 100.0);
            }
            return Err(CollectError::unavailable("ram row reports zero size"));
        }
        Err(CollectError::unavailable("no ram storage row"))
    }

    /// 所有固定磁盘按分配单元换算后汇总，容量为零的行不参与
    fn disk_percent(&self) -> FieldResult<f64> {
        let mut total_bytes = 0.0f64;
        let mut used_bytes = 0.0f64;
        for row in self.rows.values() {
            let is_disk = row
                .storage_type
                .as_deref()
                .map(|t| t.ends_with(STORAGE_TYPE_FIXED_DISK))
                .unwrap_or(false);
            if !is_disk {
                continue;
            }
            let units = row.allocation_units.unwrap_or(0);
            let size = row.size.unwrap_or(0);
            if units <= 0 || size <= 0 {
                continue;
            }
            let used = row.used.unwrap_or(0).max(0);
            total_bytes += size as f64 * units as f64;
            used_bytes += used as f64 * units as f64;
        }
        if total_bytes <= 0.0 {
            return Err(CollectError::unavailable("no fixed disk rows"));
        }
        Ok(used_bytes / total_bytes * 100.0)
    }
}

/// 按列遍历 hrStorage 表
///
/// 列顺序固定。哪一列遍历出错就停在哪，已经攒下的行保留，
/// 后面的列不再发请求。
async fn walk_storage_table(client: &dyn SnmpClient) -> StorageTable {
    let mut table = StorageTable::default();

    let columns = [
        HR_STORAGE_TYPE,
        HR_STORAGE_ALLOCATION_UNITS,
        HR_STORAGE_SIZE,
        HR_STORAGE_USED,
    ];
    for column in columns {
        let rows = match client.walk(column).await {
            Ok(rows) => rows,
            Err(e) => {
                debug!(column = %column, error = %e, "Storage walk stopped early");
                return table;
            }
        };
        for (oid, value) in rows {
            let suffix = match index_suffix(column, &oid) {
                Some(suffix) => suffix.to_string(),
                None => continue,
            };
            let row = table.row(&suffix);
            match column {
                HR_STORAGE_TYPE => row.storage_type = value.as_oid().map(str::to_string),
                HR_STORAGE_ALLOCATION_UNITS => row.allocation_units = value.as_i64(),
                HR_STORAGE_SIZE => row.size = value.as_i64(),
                _ => row.used = value.as_i64(),
            }
        }
    }
    table
}

/// 完整 OID 去掉列前缀得到行号
fn index_suffix<'a>(column: &str, oid: &'a str) -> Option<&'a str> {
    oid.strip_prefix(column)?.strip_prefix('.')
}
