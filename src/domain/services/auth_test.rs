use std::sync::Arc;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::envelope;

use super::AuthService;
use crate::domain::services::Credentials;
use crate::domain::services::Notifier;
use crate::infrastructure::api::ApiClient;

fn service_for(url: &str, file_path: std::path::PathBuf, app_user_id: &str) -> AuthService {
    let client = ApiClient::new(url, 5000, Credentials::new(file_path), Notifier::new().0).unwrap();

    return AuthService {
        client: Arc::new(client),
        configured_app_user_id: app_user_id.to_string(),
    };
}

#[tokio::test]
async fn it_logs_in_and_persists_the_token() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("credentials.json");

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/admin/login/")
        .match_body(Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "hunter2",
        })))
        .with_status(200)
        .with_body(envelope(json!({
            "access": "jwt-1",
            "id": 5,
            "username": "ada",
            "email": "ada@example.com",
        })))
        .create_async()
        .await;

    let service = service_for(&server.url(), file_path.clone(), "");
    let user = service.login("ada@example.com", "hunter2").await?;
    mock.assert_async().await;

    assert_eq!(user.id, "5");
    assert_eq!(user.username, Some("ada".to_string()));

    let stored = Credentials::load(file_path).await?;
    assert_eq!(stored.token(), "Bearer jwt-1");
    assert_eq!(stored.user_info(), user);

    return Ok(());
}

#[tokio::test]
async fn it_keeps_credentials_when_login_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("credentials.json");

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/admin/login/")
        .with_status(400)
        .create_async()
        .await;

    let service = service_for(&server.url(), file_path.clone(), "");
    let res = service.login("ada@example.com", "wrong").await;

    assert_eq!(res.unwrap_err().to_string(), "Request parameter error.");
    assert!(!file_path.exists());
    return Ok(());
}

#[tokio::test]
async fn it_authenticates_app_users() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("credentials.json");

    let mut server = mockito::Server::new_async().await;
    let client_token = server
        .mock("POST", "/auth/client_token/")
        .match_header("Authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"applicationId": "3"})))
        .with_status(200)
        .with_body(envelope(json!({"accessToken": "client-1"})))
        .create_async()
        .await;
    let chat_auth = server
        .mock("POST", "/auth/chat_auth/")
        .match_header("Authorization", "Bearer client-1")
        .match_body(Matcher::Json(json!({
            "appUserId": "visitor-9",
            "email": "visitor-9@lingx.ai",
        })))
        .with_status(200)
        .with_body(envelope(json!({"id": 77, "accessToken": "chat-1"})))
        .create_async()
        .await;

    let service = service_for(&server.url(), file_path.clone(), "visitor-9");
    service.client.credentials().set_token("Bearer stale");
    let user = service.auth("3").await?;

    client_token.assert_async().await;
    chat_auth.assert_async().await;
    assert_eq!(user.id, "77");

    let stored = Credentials::load(file_path).await?;
    assert_eq!(stored.token(), "Bearer chat-1");
    assert_eq!(stored.app_user_id(), "visitor-9");

    return Ok(());
}

#[tokio::test]
async fn it_generates_and_reuses_app_user_ids() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("credentials.json");

    let service = service_for("http://localhost", file_path.clone(), "");
    let first = service.app_user_id().await?;
    assert!(!first.is_empty());
    assert_eq!(service.app_user_id().await?, first);

    let stored = Credentials::load(file_path.clone()).await?;
    assert_eq!(stored.app_user_id(), first);

    let configured = service_for("http://localhost", file_path, "embedded-user");
    assert_eq!(configured.app_user_id().await?, "embedded-user");

    return Ok(());
}

#[tokio::test]
async fn it_logs_out_but_keeps_the_app_user() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("credentials.json");

    let service = service_for("http://localhost", file_path.clone(), "");
    let credentials = service.client.credentials();
    credentials.set_token("Bearer jwt-1");
    credentials.set_app_user_id("visitor-9");

    service.logout().await?;

    let stored = Credentials::load(file_path).await?;
    assert!(!stored.is_authenticated());
    assert_eq!(stored.app_user_id(), "visitor-9");

    return Ok(());
}
