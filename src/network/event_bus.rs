// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Named-event publish/subscribe registry

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// Event carrying a completed record to the obfuscation listener
pub const NETWORK_DATA_OBFUSCATION_HANDLER_EVENT: &str = "IBGSetNetworkDataObfuscationHandler";

/// Subscriber callback
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    event: String,
    id: u64,
}

impl Subscription {
    /// Event this subscription is registered under
    pub fn event(&self) -> &str {
        &self.event
    }
}

/// Event bus mapping event names to ordered subscriber lists.
///
/// The same callback may be registered more than once and is then invoked
/// once per registration.
pub struct EventBus<T> {
    listeners: DashMap<String, Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T> EventBus<T> {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback under an event name
    pub fn subscribe<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(callback)));

        Subscription {
            event: event.to_string(),
            id,
        }
    }

    /// Remove one registration. Unknown or already removed handles are ignored.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        if let Some(mut list) = self.listeners.get_mut(&subscription.event) {
            list.retain(|(id, _)| *id != subscription.id);
        }
    }

    /// Remove every registration for an event
    pub fn remove_all(&self, event: &str) {
        self.listeners.remove(event);
    }

    /// Invoke every listener of `event` in registration order.
    ///
    /// Listeners run on a snapshot taken before the first call, so a
    /// listener may subscribe or unsubscribe without affecting this emission.
    /// A panicking listener is logged and the rest still run.
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &str, payload: &T) -> usize {
        let snapshot = self.listeners(event);

        for (index, listener) in snapshot.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                tracing::error!(event, index, "Event listener panicked");
            }
        }

        snapshot.len()
    }

    /// Snapshot of the listeners registered for an event
    pub fn listeners(&self, event: &str) -> Vec<Listener<T>> {
        self.listeners
            .get(event)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of listeners registered for an event
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|l| l.len()).unwrap_or(0)
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
