use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::Message;
use super::Step;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub question: String,
    pub task_id: String,
    pub application_id: String,
}

impl ChatRequest {
    pub fn from_message(message: &Message) -> ChatRequest {
        return ChatRequest {
            question: message.question.to_string(),
            task_id: message.task_id.clone().unwrap_or_default(),
            application_id: message.application_id.clone().unwrap_or_default(),
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub message_id: String,
    pub language: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub task_id: String,
}

#[async_trait]
pub trait ChatBackend {
    /// Asks a question and waits for the whole answer. Returns the message
    /// payload the server produced.
    async fn chat(&self, req: ChatRequest) -> Result<Value>;

    /// Asks a question and streams progress back. Every server event carries
    /// the complete step history so far and is forwarded through the channel
    /// in arrival order. Returns once the stream closes.
    async fn chat_stream<'a>(
        &self,
        req: ChatRequest,
        tx: &'a mpsc::UnboundedSender<Vec<Step>>,
    ) -> Result<()>;

    /// Generates the chart option for a completed message. The returned
    /// payload is a partial message.
    async fn generate_chart(&self, req: ChartRequest) -> Result<Value>;

    async fn cancel_chat(&self, req: CancelRequest) -> Result<Value>;
}

pub type ChatBackendBox = Arc<dyn ChatBackend + Send + Sync>;
