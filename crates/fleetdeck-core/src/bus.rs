// ── Selection bus ──
//
// Process-wide publish/subscribe channel carrying boat selections between
// components that do not reference each other. Subscribers live in an
// ordered, copy-on-write table: publishing walks a snapshot without any
// lock, and registration order is delivery order.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::model::BoatId;

/// A boat was selected somewhere in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub boat_id: BoatId,
}

impl SelectionEvent {
    pub fn new(boat_id: impl Into<BoatId>) -> Self {
        Self {
            boat_id: boat_id.into(),
        }
    }
}

type Handler = Box<dyn Fn(&SelectionEvent) + Send + Sync>;

struct Subscriber {
    alive: AtomicBool,
    handler: Handler,
}

type SubscriberTable = IndexMap<u64, Arc<Subscriber>>;

struct BusInner {
    next_id: AtomicU64,
    subscribers: ArcSwap<SubscriberTable>,
}

/// Shared selection channel. Clones refer to the same bus.
///
/// The bus keeps no history: a subscriber registered after a publish
/// never sees it.
#[derive(Clone)]
pub struct SelectionBus {
    inner: Arc<BusInner>,
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SelectionBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl SelectionBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                subscribers: ArcSwap::from_pointee(IndexMap::new()),
            }),
        }
    }

    /// Register a handler. Delivery stops as soon as the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SelectionEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Arc::new(Subscriber {
            alive: AtomicBool::new(true),
            handler: Box::new(handler),
        });

        self.inner.subscribers.rcu(|current| {
            let mut next = SubscriberTable::clone(current);
            next.insert(id, Arc::clone(&subscriber));
            next
        });
        debug!(subscription = id, "selection subscriber registered");

        Subscription {
            id,
            subscriber,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every live subscriber, in registration order.
    ///
    /// Returns the number of handlers invoked. Subscribers registered by a
    /// handler during this call are not part of this delivery.
    pub fn publish(&self, event: SelectionEvent) -> usize {
        let snapshot = self.inner.subscribers.load_full();
        let mut delivered = 0;
        for subscriber in snapshot.values() {
            // A handler earlier in this walk may have torn down a later one.
            if subscriber.alive.load(Ordering::Acquire) {
                (subscriber.handler)(&event);
                delivered += 1;
            }
        }
        trace!(boat_id = %event.boat_id, delivered, "selection published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.load().len()
    }
}

/// Handle tying a bus subscription to its owner's lifetime.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscriber: Arc<Subscriber>,
    bus: Weak<BusInner>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscriber.alive.store(false, Ordering::Release);
        if let Some(bus) = self.bus.upgrade() {
            let id = self.id;
            bus.subscribers.rcu(|current| {
                let mut next = SubscriberTable::clone(current);
                next.shift_remove(&id);
                next
            });
            debug!(subscription = id, "selection subscriber removed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recorder(
        log: &Arc<Mutex<Vec<String>>>,
        name: &'static str,
    ) -> impl Fn(&SelectionEvent) + Send + Sync + 'static + use<> {
        let log = Arc::clone(log);
        move |event| {
            log.lock()
                .unwrap()
                .push(format!("{name}:{}", event.boat_id));
        }
    }

    #[test]
    fn every_live_subscriber_gets_exactly_one_delivery() {
        let bus = SelectionBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = bus.subscribe(recorder(&log, "a"));
        let _b = bus.subscribe(recorder(&log, "b"));
        let _c = bus.subscribe(recorder(&log, "c"));

        assert_eq!(bus.publish(SelectionEvent::new("X")), 3);
        assert_eq!(*log.lock().unwrap(), ["a:X", "b:X", "c:X"]);
    }

    #[test]
    fn dropped_subscription_receives_nothing() {
        let bus = SelectionBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = bus.subscribe(recorder(&log, "a"));
        let _b = bus.subscribe(recorder(&log, "b"));
        drop(a);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.publish(SelectionEvent::new("X")), 1);
        assert_eq!(*log.lock().unwrap(), ["b:X"]);
    }

    #[test]
    fn late_subscriber_sees_no_history() {
        let bus = SelectionBus::new();
        assert_eq!(bus.publish(SelectionEvent::new("early")), 0);

        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = bus.subscribe(recorder(&log, "a"));
        assert!(log.lock().unwrap().is_empty());

        bus.publish(SelectionEvent::new("late"));
        assert_eq!(*log.lock().unwrap(), ["a:late"]);
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = SelectionBus::new();
        let other = bus.clone();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _a = other.subscribe(recorder(&log, "a"));

        assert_eq!(bus.publish(SelectionEvent::new("X")), 1);
    }

    #[test]
    fn subscriber_torn_down_mid_publish_is_skipped() {
        let bus = SelectionBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&victim);
        let _killer = bus.subscribe(move |_| {
            slot.lock().unwrap().take();
        });
        *victim.lock().unwrap() = Some(bus.subscribe(recorder(&log, "victim")));

        assert_eq!(bus.publish(SelectionEvent::new("X")), 1);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn subscription_outliving_bus_drops_cleanly() {
        let bus = SelectionBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }
}
