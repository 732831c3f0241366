#[cfg(test)]
#[path = "event_bus_test.rs"]
mod tests;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::domain::models::Event;

pub struct Subscription {
    pub id: u64,
    pub rx: mpsc::UnboundedReceiver<Event>,
}

/// Process wide publish/subscribe for message events. Cloning the bus hands
/// out another handle onto the same subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<Event>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        self.subscribers.insert(id, tx);

        return Subscription { id, rx };
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.remove(&id);
    }

    /// Dispatches to every current subscriber. Subscribers whose receiver is
    /// gone are pruned.
    pub fn emit(&self, event: Event) {
        let closed = self
            .subscribers
            .iter()
            .filter_map(|entry| {
                if entry.value().send(event.clone()).is_err() {
                    return Some(*entry.key());
                }
                return None;
            })
            .collect::<Vec<u64>>();

        for id in closed {
            tracing::debug!(subscriber = id, "Pruning closed event subscriber");
            self.subscribers.remove(&id);
        }
    }
}
