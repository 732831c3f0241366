use anyhow::Result;
use serde_json::json;
use serde_json::Value;
use test_utils::envelope;
use tokio::sync::mpsc;

use super::ApiClient;
use super::NO_QUERY;
use crate::domain::models::Notification;
use crate::domain::models::NotifiedError;
use crate::domain::models::NotificationLevel;
use crate::domain::services::Credentials;
use crate::domain::services::Notifier;

fn client_for(url: &str, token: &str) -> (ApiClient, mpsc::UnboundedReceiver<Notification>) {
    let credentials = Credentials::new("/tmp/lingx-test-credentials.json".into());
    credentials.set_token(token);
    let (notifier, rx) = Notifier::new();

    return (ApiClient::new(url, 5000, credentials, notifier).unwrap(), rx);
}

#[tokio::test]
async fn it_sends_the_stored_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/app/3")
        .match_header("Authorization", "Bearer abc")
        .with_status(200)
        .with_body(envelope(json!({"id": 3, "name": "sales"})))
        .create_async()
        .await;

    let (client, _rx) = client_for(&server.url(), "Bearer abc");
    let res: Value = client.get("/app/3", NO_QUERY).await?;
    mock.assert_async().await;

    assert_eq!(res, json!({"id": 3, "name": "sales"}));
    return Ok(());
}

#[tokio::test]
async fn it_skips_the_header_without_a_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/admin/login/")
        .match_header("Authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(envelope(json!({"access": "t"})))
        .create_async()
        .await;

    let (client, _rx) = client_for(&server.url(), "");
    let _: Value = client.post("/admin/login/", &json!({})).await?;
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_maps_http_statuses_to_notifications() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/message")
        .with_status(401)
        .create_async()
        .await;

    let (client, mut rx) = client_for(&server.url(), "Bearer expired");
    let res = client.get::<Value, _>("/message", NO_QUERY).await;
    mock.assert_async().await;

    let text = "Unauthenticated or your certification has expired, please log in again.";
    let err = res.unwrap_err();
    assert_eq!(err.to_string(), text);
    assert!(err.downcast_ref::<NotifiedError>().is_some());
    assert_eq!(
        rx.try_recv().unwrap(),
        Notification::new(NotificationLevel::Error, text)
    );
}

#[tokio::test]
async fn it_uses_the_default_message_for_unknown_statuses() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/message")
        .with_status(418)
        .create_async()
        .await;

    let (client, mut rx) = client_for(&server.url(), "");
    let res = client.get::<Value, _>("/message", NO_QUERY).await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "Request exception, please try again later."
    );
    assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Error);
}

#[tokio::test]
async fn it_rejects_application_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/admin/login/")
        .with_status(200)
        .with_body(r#"{"code": 1, "message": "Wrong password"}"#)
        .create_async()
        .await;

    let (client, mut rx) = client_for(&server.url(), "");
    let res = client.post::<Value, _>("/admin/login/", &json!({})).await;

    assert_eq!(res.unwrap_err().to_string(), "Wrong password");
    assert_eq!(rx.try_recv().unwrap().text, "Wrong password");
}

#[tokio::test]
async fn it_treats_empty_bodies_as_success() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/message/7")
        .with_status(204)
        .create_async()
        .await;

    let (client, mut rx) = client_for(&server.url(), "");
    let res: Value = client.delete("/message/7").await?;

    assert_eq!(res, Value::Null);
    assert!(rx.try_recv().is_err());
    return Ok(());
}

#[tokio::test]
async fn it_encodes_query_params() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/app_table")
        .match_query(mockito::Matcher::UrlEncoded(
            "application".into(),
            "3".into(),
        ))
        .with_status(200)
        .with_body(envelope(json!([])))
        .create_async()
        .await;

    let (client, _rx) = client_for(&format!("{}/", server.url()), "");
    let res: Vec<Value> = client.get("/app_table", &[("application", "3")]).await?;
    mock.assert_async().await;

    assert!(res.is_empty());
    return Ok(());
}

#[tokio::test]
async fn it_downloads_raw_bytes() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/fine_tuning_example/export_example")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body("question,sql\n")
        .create_async()
        .await;

    let (client, _rx) = client_for(&server.url(), "");
    let res = client
        .get_bytes(
            "/fine_tuning_example/export_example",
            &[("applicationId", "3"), ("fileType", "csv")],
        )
        .await?;

    assert_eq!(res, b"question,sql\n".to_vec());
    return Ok(());
}
