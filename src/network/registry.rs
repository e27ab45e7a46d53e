//! An owned, thread-safe set of network callbacks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::network::events::{NetCapabilities, NetState};

/// Receives network change notifications.
///
/// Notifications may be delivered on any thread.
pub trait NetworkCallback: Send + Sync {
    /// A network became available or was lost.
    fn on_network_state_changed(&self, state: &NetState);

    /// The capabilities of the current network changed.
    fn on_network_capabilities_changed(&self, capabilities: &NetCapabilities);
}

/// Handle returned by [`CallbackRegistry::add`], used to remove a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type Entry = (CallbackId, Arc<dyn NetworkCallback>);

/// A set of callbacks with thread-safe insert, remove and fan-out.
///
/// Membership is keyed by the callback's allocation: adding the same `Arc`
/// twice keeps a single entry and returns the same id. Fan-out iterates over
/// a snapshot, so a callback may add or remove callbacks while being
/// notified. No delivery order is guaranteed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tideline::{CallbackRegistry, NetCapabilities, NetState, NetworkCallback};
///
/// struct Printer;
///
/// impl NetworkCallback for Printer {
///     fn on_network_state_changed(&self, state: &NetState) {
///         println!("available: {}", state.is_network_available);
///     }
///     fn on_network_capabilities_changed(&self, _: &NetCapabilities) {}
/// }
///
/// let registry = CallbackRegistry::new();
/// let id = registry.add(Arc::new(Printer));
/// assert_eq!(registry.len(), 1);
///
/// registry.on_network_state_changed(&NetState::default());
///
/// assert!(registry.remove(id));
/// assert!(registry.is_empty());
/// ```
#[derive(Default)]
pub struct CallbackRegistry {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<Entry>>,
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn add(&self, callback: Arc<dyn NetworkCallback>) -> CallbackId {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);

        if let Some((id, _)) = callbacks
            .iter()
            .find(|(_, existing)| Arc::ptr_eq(existing, &callback))
        {
            return *id;
        }

        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        callbacks.push((id, callback));
        id
    }

    /// Remove the callback registered under `id`.
    ///
    /// Returns true if a callback was removed.
    pub fn remove(&self, id: CallbackId) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Remove a callback by identity.
    ///
    /// Returns true if a callback was removed.
    pub fn remove_callback(&self, callback: &Arc<dyn NetworkCallback>) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(_, existing)| !Arc::ptr_eq(existing, callback));
        callbacks.len() != before
    }

    /// Remove every callback.
    pub fn clear(&self) {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn NetworkCallback>> {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

impl NetworkCallback for CallbackRegistry {
    fn on_network_state_changed(&self, state: &NetState) {
        for callback in self.snapshot() {
            callback.on_network_state_changed(state);
        }
    }

    fn on_network_capabilities_changed(&self, capabilities: &NetCapabilities) {
        for callback in self.snapshot() {
            callback.on_network_capabilities_changed(capabilities);
        }
    }
}
