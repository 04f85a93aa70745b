mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

use common::TestApp;

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Lessons API");
    assert!(body["data"]["endpoints"]["lessons"].is_string(), "missing lessons endpoint: {}", body);
    Ok(())
}

#[tokio::test]
async fn health_reports_storage_backend() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK, "unexpected health body: {}", body);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["backend"], "memory");
    Ok(())
}
