use crate::error::{CollectError, FieldResult};
use crate::partial::{merge_into, PartialSnapshot};
use ssh2::Session;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::warn;

/// CPU 使用率，LANG=C 固定 top 输出格式
const CPU_COMMAND: &str = "LANG=C top -bn1 | grep 'Cpu' | awk '{print 100-$8}'";
/// 内存使用率
const RAM_COMMAND: &str = "free -m | awk 'NR==2{printf \"%.2f\", $3*100/$2 }'";
/// 根分区使用率
const DISK_COMMAND: &str = "df -h / | awk 'NR==2{gsub(/%/,\"\",$5); print $5}'";
/// 进程数
const PROCESS_COMMAND: &str = "ps -e --no-headers | wc -l";

/// 远程执行用的登录信息，密码已解密，只在内存里过一下
#[derive(Debug, Clone)]
pub struct ShellCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// 通过 SSH 执行固定命令集的采集器
pub struct ShellCollector {
    timeout: Duration,
}

/// 一轮命令的原始输出，单条命令失败对应 None
struct BatteryReadings {
    cpu: Option<String>,
    ram: Option<String>,
    disk: Option<String>,
    processes: Option<String>,
}

impl ShellCollector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 建连失败或认证失败时返回空结果，单条命令失败只丢对应字段
    pub async fn collect(&self, credentials: ShellCredentials) -> PartialSnapshot {
        let timeout = self.timeout;
        let host = credentials.host.clone();
        let joined =
            tokio::task::spawn_blocking(move || run_battery(&credentials, timeout)).await;

        let mut partial = PartialSnapshot::default();
        let readings = match joined {
            Ok(Ok(readings)) => readings,
            Ok(Err(e)) => {
                warn!(host = %host, error = %e, "Shell session failed");
                return partial;
            }
            Err(e) => {
                warn!(host = %host, error = %e, "Shell collection task failed");
                return partial;
            }
        };

        merge_into(
            &mut partial.cpu_percent,
            "cpu_percent",
            parse_float(readings.cpu.as_deref()),
        );
        merge_into(
            &mut partial.ram_percent,
            "ram_percent",
            parse_float(readings.ram.as_deref()),
        );
        merge_into(
            &mut partial.disk_percent,
            "disk_percent",
            parse_float(readings.disk.as_deref()),
        );
        merge_into(
            &mut partial.processes,
            "processes",
            parse_count(readings.processes.as_deref()),
        );
        partial
    }
}

fn run_battery(
    credentials: &ShellCredentials,
    timeout: Duration,
) -> FieldResult<BatteryReadings> {
    let target = format!("{}:{}", credentials.host, credentials.port);
    let addr = target
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| CollectError::transport(format!("cannot resolve {target}")))?;

    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    let mut session = Session::new()?;
    session.set_tcp_stream(stream);
    session.set_timeout(timeout.as_millis() as u32);
    session.handshake()?;
    session.userauth_password(&credentials.username, &credentials.password)?;

    Ok(BatteryReadings {
        cpu: run_command(&session, CPU_COMMAND),
        ram: run_command(&session, RAM_COMMAND),
        disk: run_command(&session, DISK_COMMAND),
        processes: run_command(&session, PROCESS_COMMAND),
    })
}

fn run_command(session: &Session, command: &str) -> Option<String> {
    let mut channel = session.channel_session().ok()?;
    channel.exec(command).ok()?;
    let mut output = String::new();
    channel.read_to_string(&mut output).ok()?;
    let _ = channel.wait_close();
    Some(output)
}

fn parse_float(output: Option<&str>) -> FieldResult<f64> {
    let raw = output.ok_or_else(|| CollectError::unavailable("command produced no output"))?;
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| CollectError::parse(format!("not a number: {trimmed:?}")))
}

fn parse_count(output: Option<&str>) -> FieldResult<i64> {
    let raw = output.ok_or_else(|| CollectError::unavailable("command produced no output"))?;
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| CollectError::parse(format!("not a count: {trimmed:?}")))
}
