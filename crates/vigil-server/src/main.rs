use clap::Parser;
use sea_orm::Database;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use vigil_alert::AlertEngine;
use vigil_core::CredentialSealer;
use vigil_notify::AlertDispatcher;
use vigil_probe::{ProbeConfig, ProbeContext, ProbeOrchestrator};
use vigil_store::{ensure_schema, EventStore, MetricStore, RuleStore, TargetStore};

mod api;
mod config;
mod error;
mod exposition;
mod handlers;
mod models;
mod scheduler;
mod state;

use config::AppConfig;
use scheduler::Scheduler;
use state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting vigil server with config: {}", args.config);

    let db = Arc::new(Database::connect(&config.database.url).await?);
    ensure_schema(&db).await?;

    let sealer = CredentialSealer::new(&config.security.encryption_key)?;
    let probe_config = ProbeConfig {
        max_concurrency: config.monitor.max_concurrency,
        probe_deadline: Duration::from_secs(config.monitor.probe_deadline_seconds),
        ping_timeout: Duration::from_secs(config.monitor.ping_timeout_seconds),
        shell_timeout: Duration::from_secs(config.monitor.shell_timeout_seconds),
        snmp_timeout: Duration::from_secs(config.monitor.snmp_timeout_seconds),
    };
    let context = Arc::new(ProbeContext::new(probe_config, sealer));
    let orchestrator = ProbeOrchestrator::new(
        context,
        TargetStore::new(db.clone()),
        MetricStore::new(db.clone()),
    );

    let dispatcher = AlertDispatcher::from_config(&config.notify.channels());
    let engine = AlertEngine::new(
        RuleStore::new(db.clone()),
        MetricStore::new(db.clone()),
        EventStore::new(db.clone()),
        dispatcher,
    );

    let scheduler = Arc::new(Scheduler::new(
        orchestrator,
        engine,
        MetricStore::new(db.clone()),
        &config.monitor,
    ));
    tokio::spawn(scheduler.clone().start_monitor_loop());
    tokio::spawn(scheduler.start_retention_loop());

    let state = AppState::new(
        Arc::new(TargetStore::new(db.clone())),
        Arc::new(MetricStore::new(db)),
    );
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
