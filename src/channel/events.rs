//! Push-based event delivery with explicit subscription handles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::types::{ChannelEvent, EventKind};

/// Callback registered for provider-originated events.
pub type EventCallback = Box<dyn Fn(&ChannelEvent) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;

/// Event fan-out for one channel.
///
/// Every emitted event carries a sequence number; a listener never sees the
/// same sequence twice, so replaying an event after a reconnect cannot
/// double-deliver.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    next_seq: u64,
    listeners: HashMap<u64, Listener>,
}

struct Listener {
    kind: EventKind,
    last_seq: u64,
    callback: SharedCallback,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind`. Dropping (or cancelling) the returned
    /// handle removes the listener.
    pub fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(
            id,
            Listener {
                kind,
                last_seq: 0,
                callback: Arc::from(callback),
            },
        );
        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a fresh event. Returns the sequence number assigned to it.
    pub fn emit(&self, event: &ChannelEvent) -> u64 {
        let seq = {
            let mut inner = self.inner.lock().unwrap();
            inner.next_seq += 1;
            inner.next_seq
        };
        self.deliver(event, seq);
        seq
    }

    /// Re-deliver an event that was already emitted under `seq`. Listeners
    /// that have seen `seq` are skipped, so each underlying event is
    /// delivered at most once.
    pub fn redeliver(&self, event: &ChannelEvent, seq: u64) {
        self.deliver(event, seq);
    }

    fn deliver(&self, event: &ChannelEvent, seq: u64) {
        let kind = event.kind();
        // Collect matching callbacks under the lock, invoke outside it so a
        // callback may subscribe or cancel without deadlocking.
        let callbacks: Vec<SharedCallback> = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .listeners
                .values_mut()
                .filter(|l| l.kind == kind && l.last_seq < seq)
                .map(|l| {
                    l.last_seq = seq;
                    Arc::clone(&l.callback)
                })
                .collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }
}

/// Cancellation handle for a registered listener. Cancels on drop.
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    pub fn cancel(self) {
        // Drop impl does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.lock().unwrap().listeners.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
