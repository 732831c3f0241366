#[cfg(test)]
#[path = "chat_session_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use anyhow::Result;
use futures::future::AbortHandle;
use futures::future::Abortable;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::EventBus;
use super::Notifier;
use crate::domain::models::CancelRequest;
use crate::domain::models::ChartRequest;
use crate::domain::models::ChatBackendBox;
use crate::domain::models::ChatRequest;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::NotifiedError;
use crate::domain::models::Step;
use crate::domain::models::StepName;

#[derive(Default)]
struct SessionState {
    sequence: u64,
    pending: bool,
    last_task_id: Option<String>,
    worker: Option<JoinHandle<()>>,
    abort: Option<AbortHandle>,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    return state.lock().unwrap_or_else(|err| return err.into_inner());
}

/// Owns the lifecycle of the question currently in flight for one chat
/// surface. Every submission gets a new sequence number, and workers from
/// older submissions stop touching state as soon as they notice they've
/// been superseded.
pub struct ChatSession {
    backend: ChatBackendBox,
    bus: EventBus,
    notifier: Notifier,
    state: Arc<Mutex<SessionState>>,
}

impl ChatSession {
    pub fn new(backend: ChatBackendBox, bus: EventBus, notifier: Notifier) -> ChatSession {
        return ChatSession {
            backend,
            bus,
            notifier,
            state: Arc::new(Mutex::new(SessionState::default())),
        };
    }

    pub fn is_pending(&self) -> bool {
        return lock(&self.state).pending;
    }

    /// Publishes a pending message for the question and starts answering it
    /// in the background. Returns the task id, or `None` when the question
    /// is blank or another one is still pending.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, application_id: &str, question: &str, stream: bool) -> Option<String> {
        let question = question.trim();
        let mut state = lock(&self.state);
        if state.pending || question.is_empty() {
            return None;
        }

        let message = Message::new_pending(application_id, question);
        let task_id = message.task_id.clone().unwrap_or_default();

        state.sequence += 1;
        state.pending = true;
        state.last_task_id = Some(task_id.to_string());

        tracing::debug!(task_id = %task_id, sequence = state.sequence, stream, "Submitting question");
        self.bus.emit(Event::NewMessage(message.clone()));

        let worker = Worker {
            backend: self.backend.clone(),
            bus: self.bus.clone(),
            notifier: self.notifier.clone(),
            state: self.state.clone(),
            sequence: state.sequence,
        };
        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(worker.run(message, stream), registration);
        state.abort = Some(abort);
        state.worker = Some(tokio::spawn(async move {
            if task.await.is_err() {
                tracing::debug!("Chat worker aborted");
            }
        }));

        return Some(task_id);
    }

    /// Waits for the current worker, if any, to finish or be aborted.
    pub async fn wait(&self) {
        let worker = lock(&self.state).worker.take();
        if let Some(handle) = worker {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    tracing::error!(error = ?err, "Chat worker panicked");
                }
            }
        }
    }

    /// Stops listening to the pending exchange and asks the server to cancel
    /// it. Returns whether a cancellation went through; with nothing pending
    /// this does nothing.
    pub async fn cancel(&self) -> Result<bool> {
        let task_id = {
            let mut state = lock(&self.state);
            if !state.pending {
                return Ok(false);
            }
            if let Some(abort) = state.abort.take() {
                abort.abort();
            }
            // Anything the aborted worker still has in flight is stale now.
            state.sequence += 1;
            state.last_task_id.clone()
        };

        let task_id = match task_id {
            Some(task_id) => task_id,
            None => {
                lock(&self.state).pending = false;
                return Ok(false);
            }
        };

        let res = self
            .backend
            .cancel_chat(CancelRequest {
                task_id: task_id.to_string(),
            })
            .await;
        lock(&self.state).pending = false;
        res?;

        tracing::debug!(task_id = %task_id, "Chat cancelled");
        self.bus.emit(Event::MessageCancelled());

        return Ok(true);
    }
}

struct Worker {
    backend: ChatBackendBox,
    bus: EventBus,
    notifier: Notifier,
    state: Arc<Mutex<SessionState>>,
    sequence: u64,
}

impl Worker {
    fn is_current(&self) -> bool {
        return lock(&self.state).sequence == self.sequence;
    }

    fn release(&self) {
        let mut state = lock(&self.state);
        if state.sequence == self.sequence {
            state.pending = false;
        }
    }

    fn publish(&self, message: &Message) -> bool {
        if !self.is_current() {
            tracing::debug!(sequence = self.sequence, "Dropping update from superseded chat");
            return false;
        }

        self.bus.emit(Event::NewMessage(message.clone()));
        return true;
    }

    async fn run(self, message: Message, stream: bool) {
        let res = if stream {
            self.run_stream(message).await
        } else {
            self.run_once(message).await
        };
        self.release();

        if let Err(err) = res {
            tracing::error!(error = ?err, sequence = self.sequence, "Chat request failed");
            if self.is_current() && err.downcast_ref::<NotifiedError>().is_none() {
                self.notifier.error(&format!("The chat failed with the following error: {err}"));
            }
        }
    }

    async fn run_once(&self, mut message: Message) -> Result<()> {
        let res = self.backend.chat(ChatRequest::from_message(&message)).await;
        message.is_pending_response = false;
        self.release();

        let data = match res {
            Ok(data) if !data.is_null() => data,
            Ok(_) => {
                self.publish(&message);
                return Ok(());
            }
            Err(err) => {
                self.publish(&message);
                return Err(err);
            }
        };

        if let Err(err) = message.merge(&data) {
            self.publish(&message);
            return Err(err);
        }
        self.complete(&mut message).await;

        return Ok(());
    }

    async fn run_stream(&self, mut message: Message) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Step>>();
        let req = ChatRequest::from_message(&message);
        let backend = self.backend.clone();

        let producer = async move {
            return backend.chat_stream(req, &tx).await;
        };

        let consumer = async {
            while let Some(steps) = rx.recv().await {
                if !self.apply_steps(&mut message, steps).await {
                    break;
                }
            }

            // The stream closed without a final step.
            if message.is_pending_response {
                message.is_pending_response = false;
                self.release();
                self.publish(&message);
            }
        };

        let (produced, _) = tokio::join!(producer, consumer);
        if !self.is_current() {
            return Ok(());
        }

        return produced;
    }

    /// Applies one stream event. Returns false once the worker should stop
    /// consuming.
    async fn apply_steps(&self, message: &mut Message, steps: Vec<Step>) -> bool {
        if !self.is_current() {
            return false;
        }
        if steps.is_empty() {
            tracing::warn!("Received a stream event without steps");
            return true;
        }

        // Every event carries the full history, so it replaces what we had.
        message.steps = steps;

        let latest = match message.latest_step() {
            Some(step) => step.clone(),
            None => return true,
        };
        if latest.id.is_some() {
            message.id = latest.id.clone();
        }
        if latest.task_id.is_some() {
            message.task_id = latest.task_id.clone();
        }

        if latest.step == StepName::AnswerGeneratorAgent {
            if let Some(answer) = latest.answer_result() {
                message.answer = Some(answer);
            }
        }

        if latest.is_final_completed {
            message.answer = latest.answer.clone();
            message.is_pending_response = false;
            self.release();
            self.complete(message).await;
            return false;
        }

        return self.publish(message);
    }

    /// Publishes the finished message, generating its chart first when the
    /// answer asks for one. The exchange is over at this point, so a newer
    /// submission doesn't suppress these updates.
    async fn complete(&self, message: &mut Message) {
        if message.needs_chart() {
            message.is_chart_generating = true;
            self.bus.emit(Event::NewMessage(message.clone()));
            self.generate_chart(message).await;
        }

        self.bus.emit(Event::NewMessage(message.clone()));
    }

    async fn generate_chart(&self, message: &mut Message) {
        let message_id = match &message.id {
            Some(id) => id.to_string(),
            None => {
                tracing::warn!("Cannot generate a chart for a message without an id");
                message.is_chart_generating = false;
                return;
            }
        };

        let req = ChartRequest {
            message_id,
            language: message.language(),
        };
        match self.backend.generate_chart(req).await {
            Ok(patch) => {
                if let Err(err) = message.merge(&patch) {
                    tracing::warn!(error = ?err, "Chart payload could not be merged");
                }
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Chart generation failed");
            }
        }

        message.is_chart_generating = false;
    }
}
