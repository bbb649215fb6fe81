mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use common::{expect_json, TestServer, TEST_SECRET};
use todo_api::auth::{issue_token, Claims, JwtKeys};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client().get(server.url("/health")).send().await?;
    let body = expect_json(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_is_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.client().get(server.url("/")).send().await?;
    let body = expect_json(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::test]
async fn todo_routes_require_a_token() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = server.client();

    let responses = vec![
        client.get(server.url("/api/todos")).send().await?,
        client
            .post(server.url("/api/todos"))
            .json(&serde_json::json!({ "title": "sneaky" }))
            .send()
            .await?,
        client
            .put(server.url(&format!("/api/todos/{}", Uuid::now_v7())))
            .json(&serde_json::json!({}))
            .send()
            .await?,
        client
            .delete(server.url(&format!("/api/todos/{}", Uuid::now_v7())))
            .send()
            .await?,
    ];

    for res in responses {
        let body = expect_json(res, StatusCode::UNAUTHORIZED).await?;
        assert_eq!(body["message"], "Not authorized, no token");
    }
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let foreign = JwtKeys::from_secret("not-the-server-secret")?;

    for token in ["garbage".to_string(), issue_token(&foreign, Uuid::new_v4(), 1)?] {
        let res = server
            .client()
            .get(server.url("/api/todos"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: Value = expect_json(res, StatusCode::UNAUTHORIZED).await?;
        assert_eq!(body["message"], "Not authorized, token failed");
    }
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let keys = JwtKeys::from_secret(TEST_SECRET)?;
    let now = Utc::now().timestamp();
    let token = keys.generate(&Claims {
        sub: Uuid::new_v4(),
        iat: now - 7200,
        exp: now - 3600,
    })?;

    let res = server
        .client()
        .get(server.url("/api/todos"))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn basic_scheme_is_not_accepted() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client()
        .get(server.url("/api/todos"))
        .basic_auth("user", Some("pass"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
