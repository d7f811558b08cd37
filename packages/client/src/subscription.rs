//! Subscriber registry.
//!
//! An arena of callbacks keyed by `SubscriptionId`. It knows nothing about the
//! transport: the owner decides what a subscriber count of zero means.
//!
//! Delivery is serialized by a dedicated lock that the store acquires before
//! releasing its own state lock, so snapshots reach subscribers in mutation
//! order and every subscriber sees the same sequence. Callbacks run on the
//! mutating task and must not mutate the store synchronously.

use std::{collections::BTreeMap, fmt, sync::Arc};

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::watch;

use crate::store::PresenceSnapshot;

/// Subscriber callback
pub type Callback = Arc<dyn Fn(&PresenceSnapshot) + Send + Sync>;

type ReleaseHook = Box<dyn FnOnce(SubscriptionId) + Send + Sync>;

/// Handle identifying one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Slots {
    next_id: u64,
    callbacks: BTreeMap<SubscriptionId, Callback>,
}

/// Callback arena plus a watch channel mirroring the latest snapshot.
pub struct SubscriptionRegistry {
    slots: Mutex<Slots>,
    delivery: Mutex<()>,
    watch_tx: watch::Sender<PresenceSnapshot>,
}

impl SubscriptionRegistry {
    pub fn new(initial: PresenceSnapshot) -> Self {
        let (watch_tx, _) = watch::channel(initial);
        Self {
            slots: Mutex::new(Slots {
                next_id: 0,
                callbacks: BTreeMap::new(),
            }),
            delivery: Mutex::new(()),
            watch_tx,
        }
    }

    /// Register a callback; returns its id and the new subscriber count.
    pub(crate) fn insert(&self, callback: Callback) -> (SubscriptionId, usize) {
        let mut slots = self.slots.lock();
        let id = SubscriptionId(slots.next_id);
        slots.next_id += 1;
        slots.callbacks.insert(id, callback);
        (id, slots.callbacks.len())
    }

    /// Unregister a callback; returns the remaining subscriber count, or
    /// `None` if `id` was not registered.
    pub fn remove(&self, id: SubscriptionId) -> Option<usize> {
        let mut slots = self.slots.lock();
        slots.callbacks.remove(&id).map(|_| slots.callbacks.len())
    }

    pub fn len(&self) -> usize {
        self.slots.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn watch(&self) -> watch::Receiver<PresenceSnapshot> {
        self.watch_tx.subscribe()
    }

    pub(crate) fn begin_delivery(&self) -> Delivery<'_> {
        Delivery {
            registry: self,
            _guard: self.delivery.lock(),
        }
    }
}

/// Exclusive right to deliver one snapshot.
pub(crate) struct Delivery<'a> {
    registry: &'a SubscriptionRegistry,
    _guard: MutexGuard<'a, ()>,
}

impl Delivery<'_> {
    /// Deliver `snapshot` to every subscriber and the watch channel.
    pub(crate) fn publish(self, snapshot: &PresenceSnapshot) {
        self.registry.watch_tx.send_replace(snapshot.clone());

        let callbacks: Vec<Callback> = self
            .registry
            .slots
            .lock()
            .callbacks
            .values()
            .cloned()
            .collect();

        for callback in callbacks {
            callback(snapshot);
        }
    }

    /// Deliver `snapshot` to a single, newly registered subscriber.
    pub(crate) fn deliver_to(self, callback: &Callback, snapshot: &PresenceSnapshot) {
        callback(snapshot);
    }
}

/// RAII guard of a registered subscriber; dropping it unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    release: Option<ReleaseHook>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, release: ReleaseHook) -> Self {
        Self {
            id,
            release: Some(release),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.id);
        }
    }
}
