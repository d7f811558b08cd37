//! Notification state store.
//!
//! Single source of truth for the unread count and the connection status.
//! State changes only through the operations below; each operation that
//! changes observable state notifies every subscriber synchronously, in
//! mutation order, with one shared `PresenceSnapshot`.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{
    domain::{ConnectionStatus, Notification, NotificationId, ServerSnapshot, TransportEvent},
    subscription::{Callback, SubscriptionId, SubscriptionRegistry},
};

/// What every subscriber observes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenceSnapshot {
    pub unread_count: u64,
    pub status: ConnectionStatus,
    /// `status == Connected`
    pub is_connected: bool,
    pub last_event_id: Option<NotificationId>,
    /// Incremented on every published change
    pub version: u64,
}

/// Known events kept for display and deduplication. Older ones are
/// forgotten; the unread count is unaffected and the next resync corrects it.
pub const RETAINED_EVENTS: usize = 500;

#[derive(Default)]
struct StoreState {
    events: HashMap<NotificationId, Notification>,
    /// Arrival order of `events`
    order: VecDeque<NotificationId>,
    unread_count: u64,
    status: ConnectionStatus,
    last_event_id: Option<NotificationId>,
    version: u64,
}

impl StoreState {
    fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            unread_count: self.unread_count,
            status: self.status,
            is_connected: self.status.is_connected(),
            last_event_id: self.last_event_id.clone(),
            version: self.version,
        }
    }

    fn insert(&mut self, notification: Notification) -> bool {
        if self.events.contains_key(&notification.id) {
            return false;
        }
        self.order.push_back(notification.id.clone());
        self.events.insert(notification.id.clone(), notification);
        while self.order.len() > RETAINED_EVENTS {
            if let Some(oldest) = self.order.pop_front() {
                self.events.remove(&oldest);
            }
        }
        true
    }

    fn clear(&mut self) {
        self.events.clear();
        self.order.clear();
        self.unread_count = 0;
        self.last_event_id = None;
    }
}

/// Notification state store with its subscribers.
pub struct NotificationStore {
    state: Mutex<StoreState>,
    registry: SubscriptionRegistry,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    /// Create an empty, disconnected store
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            registry: SubscriptionRegistry::new(PresenceSnapshot::default()),
        }
    }

    /// Run `f` on the state; publish a new snapshot if it reports a change.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> (R, bool)) -> R {
        let mut state = self.state.lock();
        let (result, changed) = f(&mut state);
        if changed {
            state.version += 1;
            let snapshot = state.snapshot();
            let delivery = self.registry.begin_delivery();
            drop(state);
            delivery.publish(&snapshot);
        }
        result
    }

    pub fn snapshot(&self) -> PresenceSnapshot {
        self.state.lock().snapshot()
    }

    /// Known notifications in arrival order
    pub fn notifications(&self) -> Vec<Notification> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter_map(|id| state.events.get(id).cloned())
            .collect()
    }

    /// Apply a pushed notification.
    ///
    /// Idempotent per id: returns `false` and changes nothing when the id is
    /// already known.
    pub fn apply_incoming(&self, notification: Notification) -> bool {
        self.mutate(|state| {
            let id = notification.id.clone();
            let unread = !notification.read;
            if !state.insert(notification) {
                return (false, false);
            }
            if unread {
                state.unread_count += 1;
            }
            state.last_event_id = Some(id);
            (true, true)
        })
    }

    /// Mark a known unread notification as read.
    ///
    /// Unknown or already-read ids are a no-op returning `false`. The count
    /// never goes below zero.
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        self.mutate(|state| match state.events.get_mut(id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                state.unread_count = state.unread_count.saturating_sub(1);
                (true, true)
            }
            _ => (false, false),
        })
    }

    /// Mark every known notification as read; the count becomes zero.
    ///
    /// Returns `true` if anything changed.
    pub fn mark_all_read(&self) -> bool {
        self.mutate(|state| {
            let mut changed = state.unread_count != 0;
            for notification in state.events.values_mut() {
                if !notification.read {
                    notification.read = true;
                    changed = true;
                }
            }
            state.unread_count = 0;
            (changed, changed)
        })
    }

    /// Replace local state with the server's authoritative snapshot.
    ///
    /// Takes precedence over any locally accumulated change.
    pub fn resync(&self, snapshot: ServerSnapshot) {
        self.mutate(|state| {
            state.clear();
            for notification in snapshot.notifications {
                let id = notification.id.clone();
                if state.insert(notification) {
                    state.last_event_id = Some(id);
                }
            }
            state.unread_count = snapshot.unread_count;
            ((), true)
        })
    }

    /// Set the connection status; returns `true` if it changed.
    pub fn set_status(&self, status: ConnectionStatus) -> bool {
        self.mutate(|state| {
            let changed = state.status != status;
            state.status = status;
            (changed, changed)
        })
    }

    /// Feed a transport event through the status state machine.
    pub fn transition(&self, event: TransportEvent) -> ConnectionStatus {
        self.mutate(|state| {
            let next = state.status.next(event);
            let changed = next != state.status;
            state.status = next;
            (next, changed)
        })
    }

    /// Back to the initial state: no events, zero count, disconnected.
    pub fn reset(&self) {
        self.mutate(|state| {
            let changed = !state.events.is_empty()
                || state.unread_count != 0
                || state.status != ConnectionStatus::Disconnected
                || state.last_event_id.is_some();
            state.clear();
            state.status = ConnectionStatus::Disconnected;
            ((), changed)
        })
    }

    /// Register `callback` and deliver the current snapshot to it at once.
    ///
    /// Returns the subscription id and the new subscriber count.
    pub fn subscribe(&self, callback: Callback) -> (SubscriptionId, usize) {
        let state = self.state.lock();
        let snapshot = state.snapshot();
        let delivery = self.registry.begin_delivery();
        let registered = self.registry.insert(callback.clone());
        drop(state);
        delivery.deliver_to(&callback, &snapshot);
        registered
    }

    /// Returns the remaining subscriber count, or `None` if `id` was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Option<usize> {
        self.registry.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn watch(&self) -> watch::Receiver<PresenceSnapshot> {
        self.registry.watch()
    }
}
