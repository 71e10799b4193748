#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use campus_api::auth::{Claims, Role, TokenVerifier};
use campus_api::config::AppConfig;
use campus_api::testing::MemoryStore;
use campus_api::AppState;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Response;
use serde_json::Value;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub base_url: String,
    pub store: MemoryStore,
    client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn admin_post(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token(Role::Admin))
            .json(body)
            .send()
            .await?)
    }

    pub async fn admin_delete(&self, path: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token(Role::Admin))
            .send()
            .await?)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Start the router in-process on a free port, backed by a fresh in-memory store.
pub async fn spawn_server() -> Result<TestServer> {
    let store = MemoryStore::new();
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.security.jwt_secret = TEST_SECRET.to_string();

    let state = AppState::new(Arc::new(store.clone()), TokenVerifier::from_config(&config));
    let app = campus_api::app(state, &config);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
    })
}

fn sign(role: Role, exp: i64, secret: &str) -> String {
    let claims = Claims {
        id: Uuid::from_u128(0xAD),
        email: "registrar@campus.test".to_string(),
        role,
        exp,
        iat: Some(Utc::now().timestamp()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("failed to sign test token")
}

pub fn token(role: Role) -> String {
    sign(role, (Utc::now() + Duration::hours(1)).timestamp(), TEST_SECRET)
}

pub fn expired_token() -> String {
    sign(Role::Admin, (Utc::now() - Duration::hours(1)).timestamp(), TEST_SECRET)
}

pub fn foreign_token() -> String {
    sign(Role::Admin, (Utc::now() + Duration::hours(1)).timestamp(), "some-other-secret")
}

pub fn admin_id() -> Uuid {
    Uuid::from_u128(0xAD)
}
