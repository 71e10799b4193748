mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Campus API");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::test]
async fn health_reports_database_status() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/health").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["database"], "ok");

    server.store.set_unavailable(true);
    let res = server.get("/health").await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn oversized_bodies_are_rejected_before_routing() -> Result<()> {
    let server = common::spawn_server().await?;

    // Development preset caps bodies at 1MB.
    let padding = "x".repeat(2 * 1024 * 1024);
    let res = server
        .client()
        .post(server.url("/api/admin/course/00000000-0000-0000-0000-000000000001/schedule"))
        .bearer_auth(common::token(campus_api::auth::Role::Admin))
        .header("content-type", "application/json")
        .body(format!("{{\"day\":\"{}\"}}", padding))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.store.class_sessions().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_configured_origins() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client()
        .request(reqwest::Method::OPTIONS, server.url("/api/admin/course/00000000-0000-0000-0000-000000000001/schedule"))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .send()
        .await?;
    assert!(res.status().is_success());
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    Ok(())
}
