use std::sync::Arc;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::envelope;
use tokio::sync::mpsc;

use super::MessageList;
use crate::domain::models::Confirm;
use crate::domain::models::Event;
use crate::domain::models::Locale;
use crate::domain::models::Message;
use crate::domain::models::Notification;
use crate::domain::models::NotificationLevel;
use crate::domain::services::Credentials;
use crate::domain::services::EventBus;
use crate::domain::services::Notifier;
use crate::domain::services::Subscription;
use crate::infrastructure::api::chat::MessageQuery;
use crate::infrastructure::api::ApiClient;

struct Scripted(bool);

impl Confirm for Scripted {
    fn confirm(&self, _title: &str, _content: &str) -> Result<bool> {
        return Ok(self.0);
    }
}

fn list_for(
    url: &str,
    accept: bool,
) -> (MessageList, Subscription, mpsc::UnboundedReceiver<Notification>) {
    let (notifier, notifications) = Notifier::new();
    let client = ApiClient::new(
        url,
        5000,
        Credentials::new("/tmp/lingx-test-credentials.json".into()),
        notifier.clone(),
    )
    .unwrap();
    let bus = EventBus::default();
    let subscription = bus.subscribe();

    let list = MessageList::new(
        Arc::new(client),
        bus,
        notifier,
        Box::new(Scripted(accept)),
        Locale::En,
    );

    return (list, subscription, notifications);
}

fn cached(id: &str, task_id: &str) -> Message {
    return Message {
        id: Some(id.to_string()),
        task_id: Some(task_id.to_string()),
        question: format!("Question {id}"),
        ..Message::default()
    };
}

fn page_body(ids: &[u64], next: Option<&str>, count: u64) -> String {
    let results = ids
        .iter()
        .map(|id| return json!({"id": id, "taskId": format!("t-{id}"), "question": "q"}))
        .collect::<Vec<_>>();

    return envelope(json!({
        "count": count,
        "next": next,
        "previous": null,
        "results": results,
    }));
}

#[tokio::test]
async fn it_replaces_then_appends_pages() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/message")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(page_body(&[1, 2], Some("http://localhost/message?page=2"), 3))
        .create_async()
        .await;
    server
        .mock("GET", "/message")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body(page_body(&[3], None, 3))
        .create_async()
        .await;

    let (mut list, _sub, _rx) = list_for(&server.url(), true);
    list.messages = vec![cached("99", "t-99")];

    let mut query = MessageQuery {
        page: Some(1),
        ..MessageQuery::default()
    };
    list.load(&query, false).await?;
    assert_eq!(list.messages.len(), 2);
    assert!(list.has_more);
    assert_eq!(list.total, 3);

    query.page = Some(2);
    list.load(&query, true).await?;
    let ids = list
        .messages
        .iter()
        .map(|message| return message.id.clone().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(!list.has_more);
    assert!(!list.loading);

    return Ok(());
}

#[tokio::test]
async fn it_clears_loading_when_a_load_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/message")
        .with_status(500)
        .create_async()
        .await;

    let (mut list, _sub, mut rx) = list_for(&server.url(), true);
    let res = list.load(&MessageQuery::default(), false).await;

    assert!(res.is_err());
    assert!(!list.loading);
    assert_eq!(rx.try_recv().unwrap().text, "Server exception.");
}

#[tokio::test]
async fn it_deletes_one_message() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/message/7")
        .with_status(200)
        .with_body(envelope(json!(null)))
        .create_async()
        .await;

    let (list, mut sub, mut rx) = list_for(&server.url(), true);
    assert!(list.delete("7").await?);
    mock.assert_async().await;

    assert_eq!(sub.rx.try_recv()?, Event::MessageDeleted(vec!["7".to_string()]));
    assert!(sub.rx.try_recv().is_err());
    assert_eq!(
        rx.try_recv()?,
        Notification::new(NotificationLevel::Success, "Delete success")
    );

    return Ok(());
}

#[tokio::test]
async fn it_does_nothing_when_deletion_is_declined() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/message/7")
        .expect(0)
        .create_async()
        .await;

    let (list, mut sub, _rx) = list_for(&server.url(), false);
    assert!(!list.delete("7").await?);
    mock.assert_async().await;

    assert!(sub.rx.try_recv().is_err());
    return Ok(());
}

#[tokio::test]
async fn it_warns_on_empty_batch_deletes() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/message/batch_delete")
        .expect(0)
        .create_async()
        .await;

    let (list, mut sub, mut rx) = list_for(&server.url(), true);
    assert!(!list.batch_delete(&[]).await?);
    mock.assert_async().await;

    assert_eq!(
        rx.try_recv()?,
        Notification::new(NotificationLevel::Warning, "No items selected")
    );
    assert!(sub.rx.try_recv().is_err());
    return Ok(());
}

#[tokio::test]
async fn it_batch_deletes_messages() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/message/batch_delete")
        .match_body(Matcher::Json(json!({"ids": ["1", "2"]})))
        .with_status(200)
        .with_body(envelope(json!(null)))
        .create_async()
        .await;

    let (list, mut sub, _rx) = list_for(&server.url(), true);
    let ids = vec!["1".to_string(), "2".to_string()];
    assert!(list.batch_delete(&ids).await?);
    mock.assert_async().await;

    assert_eq!(sub.rx.try_recv()?, Event::MessageDeleted(ids));
    return Ok(());
}

#[test]
fn it_applies_bus_events() {
    let (notifier, _rx) = Notifier::new();
    let client = ApiClient::new(
        "http://localhost",
        5000,
        Credentials::new("/tmp/lingx-test-credentials.json".into()),
        notifier.clone(),
    )
    .unwrap();
    let mut list = MessageList::new(
        Arc::new(client),
        EventBus::default(),
        notifier,
        Box::new(Scripted(true)),
        Locale::En,
    );
    list.messages = vec![cached("1", "t-1"), cached("2", "t-2"), cached("3", "t-3")];
    list.total = 3;

    list.apply(&Event::MessageDeleted(vec!["1".to_string(), "3".to_string()]));
    assert_eq!(list.messages.len(), 1);
    assert_eq!(list.total, 1);

    let mut updated = cached("2", "t-2");
    updated.question = "Edited".to_string();
    list.apply(&Event::NewMessage(updated));
    assert_eq!(list.messages.len(), 1);
    assert_eq!(list.messages[0].question, "Edited");

    list.apply(&Event::NewMessage(Message::new_pending("3", "Fresh")));
    assert_eq!(list.messages.len(), 2);
    assert_eq!(list.total, 2);

    list.apply(&Event::MessageCancelled());
    assert!(!list.messages[1].is_pending_response);
    assert!(list.messages[1].is_cancelled);
    assert!(!list.messages[0].is_cancelled);
}
