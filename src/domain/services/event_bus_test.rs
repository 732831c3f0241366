use anyhow::Result;

use super::EventBus;
use crate::domain::models::Event;
use crate::domain::models::Message;

#[test]
fn it_dispatches_to_every_subscriber() -> Result<()> {
    let bus = EventBus::default();
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();

    bus.emit(Event::MessageDeleted(vec!["7".to_string()]));

    assert_eq!(first.rx.try_recv()?, Event::MessageDeleted(vec!["7".to_string()]));
    assert_eq!(second.rx.try_recv()?, Event::MessageDeleted(vec!["7".to_string()]));
    assert_ne!(first.id, second.id);

    return Ok(());
}

#[test]
fn it_keeps_emit_order() -> Result<()> {
    let bus = EventBus::default();
    let mut sub = bus.subscribe();

    bus.emit(Event::NewMessage(Message::new_pending("1", "first")));
    bus.emit(Event::MessageCancelled());

    assert!(matches!(sub.rx.try_recv()?, Event::NewMessage(_)));
    assert_eq!(sub.rx.try_recv()?, Event::MessageCancelled());
    assert!(sub.rx.try_recv().is_err());

    return Ok(());
}

#[test]
fn it_stops_delivering_after_unsubscribe() {
    let bus = EventBus::default();
    let mut sub = bus.subscribe();
    bus.unsubscribe(sub.id);

    bus.emit(Event::MessageCancelled());

    assert!(sub.rx.try_recv().is_err());
    assert_eq!(bus.subscribers.len(), 0);
}

#[test]
fn it_prunes_dropped_subscribers() {
    let bus = EventBus::default();
    let sub = bus.subscribe();
    let _kept = bus.subscribe();
    drop(sub);

    bus.emit(Event::MessageCancelled());

    assert_eq!(bus.subscribers.len(), 1);
}

#[test]
fn it_shares_subscribers_across_clones() -> Result<()> {
    let bus = EventBus::default();
    let mut sub = bus.subscribe();

    bus.clone().emit(Event::MessageCancelled());

    assert_eq!(sub.rx.try_recv()?, Event::MessageCancelled());
    return Ok(());
}
