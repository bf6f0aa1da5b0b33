//! Post update notifications.
//!
//! `PostEvents` is owned by a pipeline and handed to whoever needs to listen.
//! Clones share one registry.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::models::Post;

type Callback = Arc<dyn Fn(&[Post]) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// Subscriber registry for published post sets.
#[derive(Clone, Default)]
pub struct PostEvents {
    registry: Arc<Mutex<Registry>>,
}

impl PostEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every published post set.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[Post]) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `posts` to every subscriber, in subscription order.
    ///
    /// Callbacks run synchronously on the caller's task. A panicking callback
    /// propagates to the caller.
    pub fn publish(&self, posts: &[Post]) {
        // Snapshot so callbacks may (un)subscribe without deadlocking.
        let callbacks: Vec<Callback> = self
            .lock()
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        log::debug!(
            "Publishing {} posts to {} subscribers",
            posts.len(),
            callbacks.len()
        );
        for callback in callbacks {
            callback(posts);
        }
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`PostEvents::subscribe`].
///
/// Dropping the handle keeps the callback registered.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the callback. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}
