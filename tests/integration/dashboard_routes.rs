#![allow(missing_docs)]

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use vista::{dashboard::router, demo::seed_demo, executor::SqliteExecutor, ReportGateway};

fn setup_app(name: &str) -> (TempDir, Router) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(format!("{name}.db"));
    seed_demo(&path, true).expect("seed demo data");
    (dir, app_for(path))
}

fn app_for(path: PathBuf) -> Router {
    router(ReportGateway::new(SqliteExecutor::new(path)), None, &[])
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = setup_app("health");
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn catalog_describes_parameters() {
    let (_dir, app) = setup_app("catalog");
    let (status, body) = get(app, "/api/reports").await;
    assert_eq!(status, StatusCode::OK);
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports[0]["id"], 1);
    let limit = &reports[0]["params"][0];
    assert_eq!(limit["name"], "limit");
    assert_eq!(limit["type"], "integer");
    assert_eq!(limit["default"], 10);
    assert_eq!(limit["max"], 100);
    assert_eq!(
        reports[1]["params"][0]["allowed"],
        serde_json::json!(["Ganancias Altas", "Ganancias Normales"])
    );
}

#[tokio::test]
async fn report_rows_are_wrapped_in_data() {
    let (_dir, app) = setup_app("rows");
    let (status, body) = get(app, "/api/reports/1?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["usuarios"], "Ana");
    assert_eq!(data[1]["usuarios"], "Carla");
}

#[tokio::test]
async fn encoded_enum_value_is_accepted() {
    let (_dir, app) = setup_app("enum");
    let (status, body) = get(app, "/api/reports/2?estatus=Ganancias%20Altas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_enum_is_bad_request() {
    let (_dir, app) = setup_app("bad_enum");
    let (status, body) = get(app, "/api/reports/2?estatus=InvalidValue").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Parámetros inválidos" }));
}

#[tokio::test]
async fn out_of_range_limit_is_bad_request() {
    let (_dir, app) = setup_app("bad_limit");
    for uri in [
        "/api/reports/3?limit=0",
        "/api/reports/3?limit=101",
        "/api/reports/3?limit=abc",
        "/api/reports/3?stock_min=-1",
        "/api/reports/5?fecha_fin=2024-02-30",
    ] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Parámetros inválidos");
    }
}

#[tokio::test]
async fn unknown_report_is_not_found() {
    let (_dir, app) = setup_app("not_found");
    for uri in ["/api/reports/0", "/api/reports/6", "/api/reports/01", "/api/reports/abc"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Reporte no encontrado");
    }
}

#[tokio::test]
async fn blank_filter_counts_as_absent() {
    let (_dir, app) = setup_app("blank");
    let (status, body) = get(app, "/api/reports/5?fecha_inicio=&limit=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn first_repeated_key_wins() {
    let (_dir, app) = setup_app("repeat");
    let (status, body) = get(app, "/api/reports/3?stock_min=10&stock_min=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn data_access_failure_is_opaque() {
    let dir = TempDir::new().expect("tempdir");
    let app = app_for(dir.path().join("absent.db"));
    let (status, body) = get(app, "/api/reports/4").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Error interno del servidor" }));
}

#[tokio::test]
async fn root_serves_inline_page_without_assets() {
    let (_dir, app) = setup_app("index");
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn assets_directory_is_served() {
    let dir = TempDir::new().expect("tempdir");
    let db = dir.path().join("assets.db");
    seed_demo(&db, true).expect("seed demo data");
    let assets = dir.path().join("dist");
    std::fs::create_dir(&assets).unwrap();
    std::fs::write(assets.join("index.html"), "<h1>reportes</h1>").unwrap();

    let app = router(ReportGateway::new(SqliteExecutor::new(db)), Some(assets), &[]);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>reportes</h1>");
}
