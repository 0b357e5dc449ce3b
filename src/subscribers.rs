//! Listener registry for live snapshot updates
//!
//! Listeners are kept in registration order. Notification walks a copy of
//! the list taken when it starts, so a listener may unsubscribe itself (or
//! another listener) from inside its callback without disturbing the
//! delivery in progress.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::MetricsSnapshot;

/// Callback receiving every freshly derived snapshot
pub type Listener = Rc<dyn Fn(&MetricsSnapshot)>;

/// Identifier of a registered listener, unique per registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Entries = RefCell<Vec<(SubscriberId, Listener)>>;

/// Ordered set of listeners
pub struct SubscriberRegistry {
    entries: Rc<Entries>,
    next_id: Cell<u64>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    /// Register a listener and hand back its de-registration handle
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&MetricsSnapshot) + 'static,
    {
        let id = SubscriberId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Rc::new(listener)));

        tracing::trace!(subscriber = %id, "listener registered");

        Subscription {
            id,
            entries: Rc::downgrade(&self.entries),
        }
    }

    /// Remove a listener by id; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        remove_entry(&self.entries, id)
    }

    /// Deliver a snapshot to every listener registered at call time
    pub fn notify(&self, snapshot: &MetricsSnapshot) {
        let listeners: Vec<(SubscriberId, Listener)> = self.entries.borrow().clone();

        tracing::trace!(listeners = listeners.len(), "notifying listeners");

        for (_, listener) in listeners {
            listener(snapshot);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("count", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`]
/// on teardown. The handle only holds a weak reference, so it is safe to keep
/// after the store is gone.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriberId,
    entries: Weak<Entries>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Stop receiving snapshots; returns false if already removed
    pub fn unsubscribe(&self) -> bool {
        match self.entries.upgrade() {
            Some(entries) => remove_entry(&entries, self.id),
            None => false,
        }
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.entries
            .upgrade()
            .map(|entries| entries.borrow().iter().any(|(id, _)| *id == self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

fn remove_entry(entries: &Entries, id: SubscriberId) -> bool {
    let mut entries = entries.borrow_mut();
    let before = entries.len();
    entries.retain(|(existing, _)| *existing != id);
    let removed = entries.len() != before;
    if removed {
        tracing::trace!(subscriber = %id, "listener removed");
    }
    removed
}
