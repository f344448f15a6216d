//! Synchronous publish/subscribe bus.
//!
//! # Invariants
//! - Subscribers run inline during `publish`, in subscription order.
//! - Publishing from inside a handler is allowed; the subscriber list is
//!   snapshotted before delivery so nested publishes never alias a borrow.
//! - The bus is single-threaded (`Rc`/`RefCell`); it is not `Send`.

use super::{Message, Topic};
use log::debug;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Message)>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

/// Application-owned message bus. Share it with `Rc<EventBus>`.
#[derive(Default)]
pub struct EventBus {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every message published on `topic`.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Message) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            topic,
            handler: Rc::new(handler),
        });
        debug!(
            "event=bus_subscribe module=event status=ok topic={} subscription={}",
            topic.as_str(),
            id.0
        );
        id
    }

    /// Removes a subscription. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        before != subscribers.len()
    }

    /// Delivers `message` to every subscriber of its topic.
    pub fn publish(&self, message: impl Into<Message>) {
        let message = message.into();
        let topic = message.topic();
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .map(|subscriber| Rc::clone(&subscriber.handler))
            .collect();

        debug!(
            "event=bus_publish module=event status=ok topic={} kind={} subscribers={}",
            topic.as_str(),
            message.kind(),
            handlers.len()
        );

        for handler in handlers {
            handler(&message);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .count()
    }
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}
