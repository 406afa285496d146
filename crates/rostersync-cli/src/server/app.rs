//! Axum application setup.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use crate::config::ServeConfig;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState, config: &ServeConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/csv/upload", post(handlers::upload_csv))
        .route("/sync/preview", post(handlers::preview_sync))
        .route("/sync/execute", post(handlers::execute_sync))
        .route("/sync/:session_id/log", get(handlers::download_log));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServeConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the web server and run until Ctrl+C.
pub async fn run_server(
    state: AppState,
    config: &ServeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use rostersync::store::StoreCall;
    use rostersync::{IdentityStore, InMemoryStore, Roster, RosterRecord, RosterSync, StoreError};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    const USERS_CSV: &str = "氏名,メールアドレス,役職,部署\n\
                             田中 太郎,tanaka@example.com,部長,営業部\n\
                             鈴木 一郎,suzuki@example.com,主任,経理部\n";

    const BOUNDARY: &str = "rostersync-test-boundary";

    fn roster() -> Roster {
        Roster::from_records(vec![
            RosterRecord::new("tanaka@example.com")
                .with_id("1")
                .with_name("田中 太郎")
                .with_position("課長")
                .with_department("営業部"),
            RosterRecord::new("sato@example.com")
                .with_id("2")
                .with_name("佐藤 花子")
                .with_position("課長")
                .with_department("技術部"),
        ])
    }

    fn mapping() -> Value {
        json!({"name": 0, "email": 1, "position": 2, "department": 3})
    }

    fn dry_router() -> Router {
        let state = AppState::new(RosterSync::new(), roster(), None, false);
        create_router(state, &ServeConfig::default())
    }

    fn live_router(store: Arc<InMemoryStore>) -> Router {
        let store: Arc<dyn IdentityStore> = store;
        let state = AppState::new(RosterSync::new(), roster(), Some(store), true);
        create_router(state, &ServeConfig::default())
    }

    fn multipart_request(file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\
             \r\n\
             {c}\r\n\
             --{b}--\r\n",
            b = BOUNDARY,
            f = file_name,
            c = content,
        );
        Request::builder()
            .method("POST")
            .uri("/api/csv/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload(app: &Router) -> String {
        let (status, body) = send_json(app, multipart_request("users.csv", USERS_CSV)).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send_json(
            &dry_router(),
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["known_users"], 2);
        assert_eq!(body["live_sync"], false);
    }

    #[tokio::test]
    async fn test_upload_returns_analysis() {
        let app = dry_router();
        let (status, body) = send_json(&app, multipart_request("users.csv", USERS_CSV)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["session_id"].as_str().unwrap().len(), 16);
        assert_eq!(body["headers"][1], "メールアドレス");
        assert_eq!(body["total_rows"], 2);
        assert_eq!(body["preview"][0][1], "tanaka@example.com");
        assert_eq!(body["auto_mapping"]["email"], 1);
    }

    #[tokio::test]
    async fn test_same_bytes_same_session() {
        let app = dry_router();
        assert_eq!(upload(&app).await, upload(&app).await);
    }

    #[tokio::test]
    async fn test_upload_without_filename_rejected() {
        let (status, body) = send_json(&dry_router(), multipart_request("", USERS_CSV)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_upload_empty_file_is_parse_error() {
        let (status, body) = send_json(&dry_router(), multipart_request("empty.csv", "")).await;

        assert!(status.is_client_error());
        assert_eq!(body["error"], "parse_error");
    }

    #[tokio::test]
    async fn test_preview() {
        let app = dry_router();
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/preview",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping()}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["summary"]["to_add"], 1);
        assert_eq!(body["summary"]["to_update"], 1);
        assert_eq!(body["summary"]["to_delete"], 1);
        assert_eq!(body["new_users"][0]["email"], "suzuki@example.com");
        assert_eq!(body["delete_users"][0]["email"], "sato@example.com");
    }

    #[tokio::test]
    async fn test_preview_unknown_session() {
        let (status, body) = send_json(
            &dry_router(),
            json_request(
                "/api/sync/preview",
                json!({"csvData": {"session_id": "missing"}, "mapping": mapping()}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_preview_without_email_column() {
        let app = dry_router();
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/preview",
                json!({"csvData": {"session_id": session_id}, "mapping": {"name": 0}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "configuration_error");
    }

    #[tokio::test]
    async fn test_execute_defaults_to_dry_run() {
        let app = dry_router();
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/execute",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping()}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = &body["results"];
        assert_eq!(results["id"], session_id.as_str());
        assert_eq!(results["dryRun"], true);
        assert_eq!(results["added"], 1);
        assert_eq!(results["updated"], 1);
        assert_eq!(results["deleted"], 1);
        assert!(results["startTime"].is_string());
    }

    #[tokio::test]
    async fn test_live_request_without_permission_stays_dry() {
        let store = Arc::new(InMemoryStore::from_roster(&roster()));
        let store_handle: Arc<dyn IdentityStore> = store.clone();
        let state = AppState::new(RosterSync::new(), roster(), Some(store_handle), false);
        let app = create_router(state, &ServeConfig::default());
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/execute",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping(), "dryRun": false}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["dryRun"], true);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_live_execute_writes_to_store() {
        let store = Arc::new(InMemoryStore::from_roster(&roster()));
        let app = live_router(store.clone());
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/execute",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping(), "dryRun": false}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["dryRun"], false);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Create("suzuki@example.com".to_string()),
                StoreCall::Update("tanaka@example.com".to_string()),
                StoreCall::Delete("sato@example.com".to_string()),
            ]
        );
        assert!(store.user("sato@example.com").is_none());
    }

    #[tokio::test]
    async fn test_store_unavailable_is_503() {
        let store = Arc::new(InMemoryStore::from_roster(&roster()));
        store.set_unavailable(Some("connection refused".to_string()));
        let app = live_router(store);
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/execute",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping(), "dryRun": false}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "store_unavailable");
    }

    #[tokio::test]
    async fn test_outage_mid_sync_reports_applied_writes() {
        let store = Arc::new(InMemoryStore::from_roster(&roster()));
        store.fail_on(
            "tanaka@example.com",
            StoreError::Unavailable("connection reset".to_string()),
        );
        let app = live_router(store.clone());
        let session_id = upload(&app).await;

        let (status, body) = send_json(
            &app,
            json_request(
                "/api/sync/execute",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping(), "dryRun": false}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["results"]["added"], 1);
        assert_eq!(body["results"]["deleted"], 0);
        assert!(store.user("suzuki@example.com").is_some());

        let (status, log) = send(
            &app,
            Request::get(format!("/api/sync/{}/log", session_id).as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let log = String::from_utf8(log).unwrap();
        let rows: Vec<&str> = log.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("add,suzuki@example.com,success"));
        assert!(rows[1].contains("update,tanaka@example.com,failure"));
    }

    #[tokio::test]
    async fn test_log_download_after_execute() {
        let app = dry_router();
        let session_id = upload(&app).await;
        let log_uri = format!("/api/sync/{}/log", session_id);

        let (status, _) = send(
            &app,
            Request::get(log_uri.as_str()).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(
            &app,
            json_request(
                "/api/sync/execute",
                json!({"csvData": {"session_id": session_id}, "mapping": mapping()}),
            ),
        )
        .await;

        let response = app
            .clone()
            .oneshot(Request::get(log_uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let log = String::from_utf8(body.to_vec()).unwrap();
        let mut lines = log.lines();
        assert_eq!(lines.next(), Some("processed_at,operation,email,result,error"));
        assert_eq!(lines.count(), 3);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let state = AppState::new(RosterSync::new(), roster(), None, false);
        let config = ServeConfig {
            max_upload_bytes: 64,
            ..ServeConfig::default()
        };
        let app = create_router(state, &config);

        let big = format!("{}{}", USERS_CSV, "x,y@example.com,a,b\n".repeat(20));
        let (status, _) = send(&app, multipart_request("big.csv", &big)).await;

        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_upload_evicts_oldest_session() {
        let state = AppState::new(RosterSync::new(), roster(), None, false).with_max_sessions(1);
        let app = create_router(state, &ServeConfig::default());

        let first = upload(&app).await;
        let other_csv = format!("{}佐藤 花子,sato@example.com,課長,技術部\n", USERS_CSV);
        let (status, _) = send(&app, multipart_request("more.csv", &other_csv)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            json_request(
                "/api/sync/preview",
                json!({"csvData": {"session_id": first}, "mapping": mapping()}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_with_explicit_origins() {
        let config = ServeConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..ServeConfig::default()
        };
        assert!(!config.allows_any_origin());
        let _ = cors_layer(&config);
    }
}
