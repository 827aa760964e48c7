use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// 连通性探测
///
/// ICMP 需要原始套接字权限，受限环境里探测会失败，
/// 失败一律按不可达处理。测试用假实现替换。
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn check(&self, address: &str, timeout: Duration) -> bool;
}

/// 基于 ICMP echo 的探测实现
pub struct IcmpPinger;

#[async_trait]
impl ReachabilityProbe for IcmpPinger {
    async fn check(&self, address: &str, timeout: Duration) -> bool {
        let Some(ip) = resolve(address).await else {
            debug!(address, "Address resolution failed");
            return false;
        };
        let payload = [0u8; 8];
        match tokio::time::timeout(timeout, surge_ping::ping(ip, &payload)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(address, error = %e, "Ping failed");
                false
            }
            Err(_) => {
                debug!(address, "Ping timed out");
                false
            }
        }
    }
}

/// 把地址解析成 IP，字面 IP 直接用，否则走 DNS
async fn resolve(address: &str) -> Option<IpAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Some(ip);
    }
    tokio::net::lookup_host((address, 0))
        .await
        .ok()?
        .next()
        .map(|sock| sock.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_literal_ip() {
        assert_eq!(
            resolve("127.0.0.1").await,
            Some("127.0.0.1".parse::<IpAddr>().unwrap())
        );
        assert_eq!(resolve("::1").await, Some("::1".parse::<IpAddr>().unwrap()));
    }

    #[tokio::test]
    async fn test_resolve_bad_name_is_none() {
        assert!(resolve("no-such-host.invalid").await.is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_address_is_unreachable() {
        let pinger = IcmpPinger;
        assert!(
            !pinger
                .check("no-such-host.invalid", Duration::from_millis(200))
                .await
        );
    }
}
