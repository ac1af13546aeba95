//! Similar-app broadcast bridge
//!
//! Native code (an Android service, a companion daemon) may detect a similar
//! app on its own and broadcast the package name. Listeners register with
//! [`SimilarAppEvents::subscribe`] and stay registered for exactly as long as
//! the returned [`Subscription`] lives: dropping it, or calling
//! [`Subscription::dispose`], removes the listener.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Name of the broadcast this bridge carries
pub const SIMILAR_APP_DETECTED: &str = "SimilarAppDetected";

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Listener registry for similar-app broadcasts
#[derive(Clone, Default)]
pub struct SimilarAppEvents {
    registry: Arc<Mutex<Registry>>,
}

impl SimilarAppEvents {
    /// Create a bridge with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it is called with the package name of every broadcast
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        debug!("{} listener {} added", SIMILAR_APP_DETECTED, id);

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
            active: true,
        }
    }

    /// Deliver a broadcast to every current listener, returning how many were called
    pub fn emit(&self, package_name: &str) -> usize {
        // Listeners run without the lock held so they may subscribe or unsubscribe
        let listeners: Vec<Listener> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        if listeners.is_empty() {
            warn!("{} for {} dropped: no listener", SIMILAR_APP_DETECTED, package_name);
        }
        for listener in &listeners {
            listener(package_name);
        }
        listeners.len()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

/// Registration handle; the listener is removed when this is dropped
#[must_use = "dropping a Subscription immediately removes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
    active: bool,
}

impl Subscription {
    /// Remove the listener now
    pub fn dispose(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
            debug!("{} listener {} removed", SIMILAR_APP_DETECTED, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
