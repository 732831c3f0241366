#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde_derive::Serialize;
use serde_json::json;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use super::ApiClient;
use super::NO_QUERY;
use crate::domain::models::CancelRequest;
use crate::domain::models::ChartRequest;
use crate::domain::models::ChatBackend;
use crate::domain::models::ChatRequest;
use crate::domain::models::Message;
use crate::domain::models::Page;
use crate::domain::models::Step;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

/// Filters for the message history endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ApiClient {
    pub async fn list_messages(&self, query: &MessageQuery) -> Result<Page<Message>> {
        return self.get("/message", query).await;
    }

    pub async fn get_message(&self, id: &str) -> Result<Message> {
        return self.get(&format!("/message/{id}"), NO_QUERY).await;
    }

    pub async fn delete_message(&self, id: &str) -> Result<Value> {
        return self.delete(&format!("/message/{id}")).await;
    }

    pub async fn batch_delete_messages(&self, ids: &[String]) -> Result<Value> {
        return self.post("/message/batch_delete", &json!({ "ids": ids })).await;
    }
}

/// Collects the `data:` lines of one server-sent event. Returns the payload
/// once the event's terminating blank line is seen.
#[derive(Default)]
struct EventReader {
    data: Vec<String>,
}

impl EventReader {
    fn push(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            return None;
        }

        if let Some(data) = line.strip_prefix("data:") {
            self.data.push(data.trim_start().to_string());
        }

        return None;
    }

    fn flush(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }

        let payload = self.data.join("\n");
        self.data.clear();
        return Some(payload);
    }
}

fn parse_steps(payload: &str) -> Result<Vec<Step>> {
    if payload.trim().is_empty() {
        return Ok(vec![]);
    }

    return Ok(serde_json::from_str::<Vec<Step>>(payload)?);
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn chat(&self, req: ChatRequest) -> Result<Value> {
        return self.post("/chat", &req).await;
    }

    #[allow(clippy::implicit_return)]
    async fn chat_stream<'a>(
        &self,
        req: ChatRequest,
        tx: &'a mpsc::UnboundedSender<Vec<Step>>,
    ) -> Result<()> {
        let res = self.post_stream("/chat_stream", &req).await?;

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();
        let mut reader = EventReader::default();

        while let Some(line) = lines_reader.next_line().await? {
            if let Some(payload) = reader.push(&line) {
                let steps = parse_steps(&payload)?;
                tracing::debug!(task_id = %req.task_id, steps = steps.len(), "Stream event");
                tx.send(steps)?;
            }
        }

        // A final event without its trailing blank line still counts.
        if let Some(payload) = reader.flush() {
            tx.send(parse_steps(&payload)?)?;
        }

        tracing::debug!(task_id = %req.task_id, "Stream closed");
        return Ok(());
    }

    async fn generate_chart(&self, req: ChartRequest) -> Result<Value> {
        return self.post("/generate_chart", &req).await;
    }

    async fn cancel_chat(&self, req: CancelRequest) -> Result<Value> {
        return self.post("/cancel_chat", &req).await;
    }
}
