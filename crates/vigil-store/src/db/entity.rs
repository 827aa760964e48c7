use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::{DateTime as ChronoDateTime, Utc};

/// 监控目标实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "targets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub hostname: String,
    pub address: String,
    pub system_name: Option<String>,
    pub owner: Option<String>,
    pub environment: String,
    pub tags: Option<String>,
    pub is_cluster: bool,
    pub source: String,
    pub shell_host: Option<String>,
    pub shell_port: i32,
    pub shell_username: Option<String>,
    pub shell_password_enc: Option<String>,
    pub snmp_version: Option<String>,
    pub snmp_community_enc: Option<String>,
    pub monitored_services: Option<Json>,
    pub monitored_ports: Option<Json>,
    pub created_at: ChronoDateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::metric_snapshot::Entity")]
    MetricSnapshot,
}

impl Related<super::metric_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricSnapshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub mod target {
    pub use super::*;
}

/// 指标快照实体
pub mod metric_snapshot {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "metric_snapshots")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub target_id: i64,
        pub captured_at: ChronoDateTime<Utc>,
        pub reachable: Option<bool>,
        pub cpu_percent: Option<f64>,
        pub cpu_temp: Option<f64>,
        pub ram_percent: Option<f64>,
        pub swap_percent: Option<f64>,
        pub disk_percent: Option<f64>,
        pub disk_io_read: Option<f64>,
        pub disk_io_write: Option<f64>,
        pub processes: Option<i64>,
        pub network_in_kbps: Option<f64>,
        pub network_out_kbps: Option<f64>,
        pub services_status: Option<Json>,
        pub ports_status: Option<Json>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::target::Entity",
            from = "Column::TargetId",
            to = "super::target::Column::Id"
        )]
        Target,
    }

    impl Related<super::target::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Target.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// 告警规则实体
pub mod alert_rule {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "alert_rules")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub target_id: Option<i64>,
        pub group_id: Option<i64>,
        pub metric: String,
        pub operator: String,
        pub threshold: Option<f64>,
        pub severity: String,
        pub enabled: bool,
        pub created_at: ChronoDateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::target::Entity",
            from = "Column::TargetId",
            to = "super::target::Column::Id"
        )]
        Target,
        #[sea_orm(has_many = "super::alert_event::Entity")]
        AlertEvent,
    }

    impl Related<super::alert_event::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::AlertEvent.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// 告警事件实体
pub mod alert_event {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "alert_events")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub rule_id: i64,
        pub target_id: Option<i64>,
        pub triggered_at: ChronoDateTime<Utc>,
        pub value: Option<f64>,
        pub message: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::alert_rule::Entity",
            from = "Column::RuleId",
            to = "super::alert_rule::Column::Id"
        )]
        AlertRule,
    }

    impl Related<super::alert_rule::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::AlertRule.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
