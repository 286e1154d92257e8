use super::*;
use crate::cache::ResultCache;
use crate::config::{CacheConfig, RepositoryConfig, RetryConfig};
use crate::error::ApiError;
use crate::gateway::RemoteGateway;
use crate::gateway::testing::MemoryConnector;
use crate::region::RegionTable;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const IDV60000_XML: &str = "<amoc>\
    <issue-time-utc>2024-09-05T22:44:29Z</issue-time-utc>\
    <expiry-time>2024-09-06T22:44:29Z</expiry-time>\
    <service>HFW</service>\
    <product-type>W</product-type>\
    </amoc>";

/// Router backed by an in-memory repository
fn test_app(connector: MemoryConnector) -> (Router, Arc<MemoryConnector>, TempDir) {
    test_app_with_config(connector, Config::default())
}

fn test_app_with_config(
    connector: MemoryConnector,
    mut config: Config,
) -> (Router, Arc<MemoryConnector>, TempDir) {
    let staging = TempDir::new().unwrap();
    config.repository = RepositoryConfig {
        host: "ftp.test".into(),
        local_staging_directory: staging.path().to_path_buf(),
        retry: RetryConfig {
            max_attempts: 1,
            initial_delay: Duration::from_millis(1),
            ..Default::default()
        },
        ..Default::default()
    };

    let connector = Arc::new(connector);
    let service = Arc::new(WarningService::new(
        RemoteGateway::with_connector(config.repository.clone(), connector.clone()),
        Arc::new(ResultCache::new(&CacheConfig::default())),
        RegionTable::default(),
        Duration::from_secs(600),
    ));

    (create_router(service, Arc::new(config)), connector, staging)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _staging) = test_app(MemoryConnector::new());

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let (app, _, _staging) = test_app(MemoryConnector::new());

    let response = get(&app, "/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["paths"].get("/warnings").is_some());
}

#[tokio::test]
async fn list_warnings_returns_identifiers() {
    let (app, _, _staging) = test_app(
        MemoryConnector::new()
            .with_file("IDV60000.amoc.xml", IDV60000_XML)
            .with_file("IDV60000_other.txt", "x")
            .with_file("IDV36310.amoc.xml", IDV60000_XML),
    );

    let response = get(&app, "/warnings?state=vic").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!(["IDV60000", "IDV36310"])
    );
}

#[tokio::test]
async fn list_warnings_requires_state() {
    let (app, connector, _staging) = test_app(MemoryConnector::new());

    for uri in ["/warnings", "/warnings?state=", "/warnings?state=%20"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let body: ApiError = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(body.error.code, "validation_error");
    }
    assert_eq!(connector.opens(), 0);
}

#[tokio::test]
async fn empty_warning_list_is_not_found() {
    let (app, _, _staging) =
        test_app(MemoryConnector::new().with_file("IDQ20885.amoc.xml", IDV60000_XML));

    assert_eq!(get(&app, "/warnings?state=VIC").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/warnings?state=XYZ").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_warning_returns_detail() {
    let (app, _, _staging) = test_app(
        MemoryConnector::new()
            .with_file("IDV60000.amoc.xml", IDV60000_XML)
            .with_file("IDV60000.txt", "Minor flooding along the Yarra River"),
    );

    let response = get(&app, "/warning/IDV60000").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({
            "productType": "Warning",
            "service": "Flood Warning Service",
            "issueTimeUtc": "2024-09-05T22:44:29Z",
            "expiryTime": "2024-09-06T22:44:29Z",
            "text": "Minor flooding along the Yarra River",
        })
    );
}

#[tokio::test]
async fn get_warning_rejects_invalid_id() {
    let (app, connector, _staging) = test_app(MemoryConnector::new());

    let response = get(&app, "/warning/IDV60000.amoc.xml").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"]["id"], "IDV60000.amoc.xml");
    assert_eq!(connector.opens(), 0);
}

#[tokio::test]
async fn unknown_warning_is_not_found() {
    let (app, _, _staging) =
        test_app(MemoryConnector::new().with_file("IDV60000.amoc.xml", IDV60000_XML));

    let response = get(&app, "/warning/UNKNOWNID").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn malformed_document_is_internal_error() {
    let (app, _, _staging) = test_app(
        MemoryConnector::new().with_file("IDV60000.amoc.xml", "<amoc><service>HFW</amoc>"),
    );

    let response = get(&app, "/warning/IDV60000").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["message"], "internal server error");
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _, _staging) = test_app(MemoryConnector::new());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.api.cors_enabled = false;
    let (app, _, _staging) = test_app_with_config(MemoryConnector::new(), config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn swagger_ui_is_opt_in() {
    let (app, _, _staging) = test_app(MemoryConnector::new());
    assert_eq!(get(&app, "/swagger-ui/").await.status(), StatusCode::NOT_FOUND);

    let mut config = Config::default();
    config.api.swagger_ui = true;
    let (app, _, _staging) = test_app_with_config(MemoryConnector::new(), config);
    assert_ne!(get(&app, "/swagger-ui/").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_server_shuts_down_on_cancel() {
    let (_, connector, _staging) = test_app(MemoryConnector::new());
    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let service = Arc::new(WarningService::new(
        RemoteGateway::with_connector(config.repository.clone(), connector),
        Arc::new(ResultCache::new(&CacheConfig::default())),
        RegionTable::default(),
        Duration::from_secs(600),
    ));
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(start_api_server(service, Arc::new(config), shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after cancellation")
        .unwrap();
    assert!(result.is_ok());
}
