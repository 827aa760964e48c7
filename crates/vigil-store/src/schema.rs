use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::error::Result;

/// SQLite 建表语句
///
/// Postgres 环境的表结构由管理层维护，这里只为
/// 本地 SQLite 与测试环境兜底。
const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS targets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        hostname TEXT NOT NULL,
        address TEXT NOT NULL,
        system_name TEXT,
        owner TEXT,
        environment TEXT NOT NULL DEFAULT 'prod',
        tags TEXT,
        is_cluster INTEGER NOT NULL DEFAULT 0,
        source TEXT NOT NULL DEFAULT 'auto',
        shell_host TEXT,
        shell_port INTEGER NOT NULL DEFAULT 22,
        shell_username TEXT,
        shell_password_enc TEXT,
        snmp_version TEXT,
        snmp_community_enc TEXT,
        monitored_services TEXT,
        monitored_ports TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metric_snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        target_id INTEGER NOT NULL,
        captured_at TEXT NOT NULL,
        reachable INTEGER,
        cpu_percent REAL,
        cpu_temp REAL,
        ram_percent REAL,
        swap_percent REAL,
        disk_percent REAL,
        disk_io_read REAL,
        disk_io_write REAL,
        processes INTEGER,
        network_in_kbps REAL,
        network_out_kbps REAL,
        services_status TEXT,
        ports_status TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_metric_snapshots_target_time
        ON metric_snapshots (target_id, captured_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS alert_rules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        target_id INTEGER,
        group_id INTEGER,
        metric TEXT NOT NULL,
        operator TEXT NOT NULL,
        threshold REAL,
        severity TEXT NOT NULL DEFAULT 'warning',
        enabled INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS alert_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rule_id INTEGER NOT NULL,
        target_id INTEGER,
        triggered_at TEXT NOT NULL,
        value REAL,
        message TEXT NOT NULL
    )
    "#,
];

/// 确保表结构存在
///
/// 只在 SQLite 后端执行，其他后端直接返回。
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    if db.get_database_backend() != DatabaseBackend::Sqlite {
        debug!("Schema bootstrap skipped, backend is not sqlite");
        return Ok(());
    }

    for sql in CREATE_TABLES {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            sql.to_string(),
        ))
        .await?;
    }
    debug!("Schema bootstrap complete");
    Ok(())
}
