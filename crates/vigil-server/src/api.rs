use crate::handlers::{list_targets, prometheus_metrics, target_history};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建 API 路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // Prometheus 导出
        .route("/metrics", get(prometheus_metrics))
        // 目标查询 API
        .route("/api/v1/targets", get(list_targets))
        .route("/api/v1/targets/:id/history", get(target_history))
        // 添加中间件
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 健康检查
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};
    use std::sync::Arc;
    use tower::ServiceExt;
    use vigil_core::{MetricSnapshot, Target};
    use vigil_store::{ensure_schema, metric_snapshot, target, MetricStore, TargetStore};

    async fn setup() -> (Router, Arc<DatabaseConnection>) {
        let db = Arc::new(Database::connect("sqlite::memory:").await.unwrap());
        ensure_schema(&db).await.unwrap();
        let state = AppState::new(
            Arc::new(TargetStore::new(db.clone())),
            Arc::new(MetricStore::new(db.clone())),
        );
        (create_router(state), db)
    }

    async fn seed_target(db: &DatabaseConnection, target: Target) -> i64 {
        let active: target::ActiveModel = target.into();
        active.insert(db).await.unwrap().id
    }

    async fn seed_snapshot(db: &DatabaseConnection, snapshot: MetricSnapshot) {
        let active: metric_snapshot::ActiveModel = snapshot.into();
        active.insert(db).await.unwrap();
    }

    async fn get_response(router: &Router, uri: &str) -> axum::response::Response {
        router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (router, _db) = setup().await;
        let response = get_response(&router, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let (router, db) = setup().await;
        let id = seed_target(&db, Target::new("web-01", "10.0.0.5")).await;
        let mut snapshot = MetricSnapshot::new(id);
        snapshot.reachable = Some(true);
        snapshot.cpu_percent = Some(42.5);
        seed_snapshot(&db, snapshot).await;

        let response = get_response(&router, "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; version=0.0.4"
        );

        let body = body_string(response).await;
        assert!(body.contains("# TYPE target_cpu_percent gauge"));
        let labels = format!(
            "target_id=\"{}\",hostname=\"web-01\",address=\"10.0.0.5\"",
            id
        );
        assert!(body.contains(&format!("target_reachable{{{}}} 1", labels)));
        assert!(body.contains(&format!("target_cpu_percent{{{}}} 42.5", labels)));
        assert!(!body.contains("target_ram_percent{"));
        assert!(body.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_metrics_keeps_headers_without_snapshots() {
        let (router, db) = setup().await;
        seed_target(&db, Target::new("web-01", "10.0.0.5")).await;

        let response = get_response(&router, "/metrics").await;
        let body = body_string(response).await;
        assert!(body.contains("# HELP target_reachable "));
        assert!(!body.contains("target_reachable{"));
        assert_eq!(body.lines().count(), 22);
    }

    #[tokio::test]
    async fn test_list_targets_with_and_without_snapshot() {
        let (router, db) = setup().await;
        let mut monitored = Target::new("web-01", "10.0.0.5");
        monitored.owner = Some("平台组".to_string());
        let with_id = seed_target(&db, monitored).await;
        let bare_id = seed_target(&db, Target::new("db-01", "10.0.0.6")).await;

        let mut snapshot = MetricSnapshot::new(with_id);
        snapshot.cpu_percent = Some(55.0);
        snapshot.network_in_kbps = Some(1024.0);
        snapshot.network_out_kbps = Some(512.0);
        seed_snapshot(&db, snapshot).await;

        let response = get_response(&router, "/api/v1/targets").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);

        let first = items.iter().find(|item| item["id"] == with_id).unwrap();
        assert_eq!(first["hostname"], "web-01");
        assert_eq!(first["owner"], "平台组");
        assert_eq!(first["latest_metric"]["cpu_percent"], 55.0);
        assert_eq!(first["latest_metric"]["network_io"], 1.5);

        let second = items.iter().find(|item| item["id"] == bare_id).unwrap();
        assert!(second["latest_metric"].is_null());
    }

    #[tokio::test]
    async fn test_history_unknown_target_is_404() {
        let (router, _db) = setup().await;
        let response = get_response(&router, "/api/v1/targets/999/history").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Target 999 not found");
    }

    #[tokio::test]
    async fn test_history_window_and_order() {
        let (router, db) = setup().await;
        let id = seed_target(&db, Target::new("web-01", "10.0.0.5")).await;

        let mut stale = MetricSnapshot::new(id);
        stale.captured_at = Utc::now() - Duration::minutes(1500);
        stale.cpu_percent = Some(10.0);
        seed_snapshot(&db, stale).await;

        let mut earlier = MetricSnapshot::new(id);
        earlier.captured_at = Utc::now() - Duration::minutes(60);
        earlier.cpu_percent = Some(20.0);
        seed_snapshot(&db, earlier).await;

        let mut recent = MetricSnapshot::new(id);
        recent.captured_at = Utc::now() - Duration::minutes(5);
        recent.cpu_percent = Some(30.0);
        seed_snapshot(&db, recent).await;

        // 默认窗口 120 分钟，升序返回
        let uri = format!("/api/v1/targets/{}/history", id);
        let response = get_response(&router, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["cpu_percent"], 20.0);
        assert_eq!(items[1]["cpu_percent"], 30.0);

        // 超大窗口收紧到 24 小时，1500 分钟前的快照仍被排除
        let uri = format!("/api/v1/targets/{}/history?minutes=99999", id);
        let json = body_json(get_response(&router, &uri).await).await;
        assert_eq!(json.as_array().unwrap().len(), 2);

        // 窗口下限 1 分钟
        let uri = format!("/api/v1/targets/{}/history?minutes=0", id);
        let json = body_json(get_response(&router, &uri).await).await;
        assert!(json.as_array().unwrap().is_empty());
    }
}
