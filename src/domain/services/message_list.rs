#[cfg(test)]
#[path = "message_list_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;

use super::EventBus;
use super::Notifier;
use crate::domain::models::ConfirmBox;
use crate::domain::models::Event;
use crate::domain::models::Locale;
use crate::domain::models::Message;
use crate::domain::models::Text;
use crate::infrastructure::api::chat::MessageQuery;
use crate::infrastructure::api::ApiClient;

/// Paginated cache of the message history. Deletions and new answers arrive
/// through the event bus so every view holding a list stays in sync.
pub struct MessageList {
    client: Arc<ApiClient>,
    bus: EventBus,
    notifier: Notifier,
    confirm: ConfirmBox,
    locale: Locale,
    pub loading: bool,
    pub has_more: bool,
    pub total: u64,
    pub messages: Vec<Message>,
}

impl MessageList {
    pub fn new(
        client: Arc<ApiClient>,
        bus: EventBus,
        notifier: Notifier,
        confirm: ConfirmBox,
        locale: Locale,
    ) -> MessageList {
        return MessageList {
            client,
            bus,
            notifier,
            confirm,
            locale,
            loading: false,
            has_more: false,
            total: 0,
            messages: vec![],
        };
    }

    /// Fetches one page. `incremental` appends it to the cache instead of
    /// replacing the cache.
    pub async fn load(&mut self, query: &MessageQuery, incremental: bool) -> Result<()> {
        self.loading = true;
        let res = self.client.list_messages(query).await;
        self.loading = false;

        let page = res?;
        if incremental {
            self.messages.extend(page.results);
        } else {
            self.messages = page.results;
        }
        self.has_more = page.next.is_some();
        self.total = page.count;

        return Ok(());
    }

    pub async fn get(&self, id: &str) -> Result<Message> {
        return self.client.get_message(id).await;
    }

    /// Returns false when the user declined.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        if !self.confirmed()? {
            return Ok(false);
        }

        self.client.delete_message(id).await?;
        self.bus.emit(Event::MessageDeleted(vec![id.to_string()]));
        self.notifier.success(self.locale.text(Text::DeleteSuccess));

        return Ok(true);
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<bool> {
        if ids.is_empty() {
            self.notifier.warning(self.locale.text(Text::NoItemsSelected));
            return Ok(false);
        }
        if !self.confirmed()? {
            return Ok(false);
        }

        self.client.batch_delete_messages(ids).await?;
        self.bus.emit(Event::MessageDeleted(ids.to_vec()));
        self.notifier.success(self.locale.text(Text::DeleteSuccess));

        return Ok(true);
    }

    fn confirmed(&self) -> Result<bool> {
        return self.confirm.confirm(
            self.locale.text(Text::DeleteConfirm),
            self.locale.text(Text::DeleteTip),
        );
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::NewMessage(message) => {
                let existing = self.messages.iter_mut().find(|cached| {
                    return cached.task_id.is_some() && cached.task_id == message.task_id;
                });
                if let Some(cached) = existing {
                    *cached = message.clone();
                } else {
                    self.messages.push(message.clone());
                    self.total += 1;
                }
            }
            Event::MessageDeleted(ids) => {
                let before = self.messages.len();
                self.messages.retain(|message| {
                    return match &message.id {
                        Some(id) => !ids.contains(id),
                        None => true,
                    };
                });
                let removed = (before - self.messages.len()) as u64;
                self.total = self.total.saturating_sub(removed);
            }
            Event::MessageCancelled() => {
                for message in self.messages.iter_mut() {
                    if message.is_pending_response {
                        message.is_pending_response = false;
                        message.is_cancelled = true;
                    }
                }
            }
        }
    }
}
