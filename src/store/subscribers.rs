//! Subscriber registry and unsubscribe handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::observability::metrics;
use crate::skeleton::FinalConfiguration;

/// Callback invoked with the post-update configuration.
pub type Callback = dyn Fn(&Arc<FinalConfiguration>) + Send + Sync;

/// Callbacks in registration order. Every change is mirrored into the
/// `composer_subscribers` gauge.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Arc<Callback>)>>,
}

impl SubscriberRegistry {
    pub(crate) fn register(&self, callback: Arc<Callback>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.lock();
        entries.push((id, callback));
        metrics::record_subscribers(entries.len());
        id
    }

    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        metrics::record_subscribers(entries.len());
        entries.len() != before
    }

    /// Copy of the current callbacks, so none are invoked under the lock.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Callback>> {
        self.lock().iter().map(|(_, cb)| cb.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Arc<Callback>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`ConfigStore::subscribe`](crate::store::ConfigStore::subscribe).
///
/// Dropping the handle keeps the subscription; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: &Arc<SubscriberRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving notifications. Returns false if the store is gone.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.remove(self.id))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.len())
            .finish()
    }
}
