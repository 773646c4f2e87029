//! The process-wide callback registry.
//!
//! [`EventRegistry`] maps a message [`Key`] to the callback of the controller
//! that owns that message. It also keeps:
//!
//! - a set of locked keys, the cooperative re-entrancy guard used by the
//!   router in serialized mode
//! - the last-seen values of every select menu on a message
//!
//! One registry exists per process ([`EventRegistry::global`]); it is one
//! logical event bus, not one per controller. Tests and embedders that want
//! isolation can build their own with [`EventRegistry::new`].
//!
//! ```text
//! register(key, cb) ──► ActionReference (non-owning)
//!        │
//!        ▼
//!  callbacks: Key → (id, Callback)      locks: {Key}      selections: Key → {component → values}
//!        ▲
//!        │
//! unregister(key) / release(&reference) / clear()
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::foundation::error::BoxError;
use crate::foundation::event::InteractionContext;
use crate::foundation::key::Key;

/// A type alias for a boxed, pinned future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The function a controller registers for its message.
pub type Callback =
    Arc<dyn Fn(InteractionContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Converts an async closure into a [`Callback`].
pub fn into_callback<F, Fut>(f: F) -> Callback
where
    F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

struct Entry {
    id: u64,
    callback: Callback,
}

static GLOBAL_REGISTRY: LazyLock<Arc<EventRegistry>> =
    LazyLock::new(|| Arc::new(EventRegistry::new()));

/// Thread-safe map from message keys to callbacks.
///
/// # Thread Safety
///
/// All operations take `&self` and may be called concurrently from any
/// number of event handlers.
pub struct EventRegistry {
    callbacks: RwLock<HashMap<Key, Entry>>,
    locks: Mutex<HashSet<Key>>,
    selections: RwLock<HashMap<Key, HashMap<String, Vec<String>>>>,
    next_id: AtomicU64,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashSet::new()),
            selections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the process-wide registry, creating it on first use.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Registers `callback` for `key`, replacing any previous callback.
    ///
    /// The returned [`ActionReference`] observes this particular
    /// registration: it turns invalid once the key is unregistered or
    /// registered again.
    pub fn register(self: &Arc<Self>, key: Key, callback: Callback) -> ActionReference {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let replaced = self
            .callbacks
            .write()
            .insert(key.clone(), Entry { id, callback })
            .is_some();

        debug!(key = %key, replaced, "Registered callback");

        ActionReference {
            key,
            id,
            registry: Arc::downgrade(self),
        }
    }

    /// Removes the callback and selection state for `key`.
    ///
    /// Idempotent: returns `false` if nothing was registered.
    pub fn unregister(&self, key: &Key) -> bool {
        let removed = self.callbacks.write().remove(key).is_some();
        self.selections.write().remove(key);

        if removed {
            debug!(key = %key, "Unregistered callback");
        }
        removed
    }

    /// Removes the registration observed by `reference`, but only if it is
    /// still the current one for its key.
    pub fn release(&self, reference: &ActionReference) -> bool {
        let removed = {
            let mut callbacks = self.callbacks.write();
            match callbacks.get(&reference.key) {
                Some(entry) if entry.id == reference.id => {
                    callbacks.remove(&reference.key);
                    true
                }
                _ => false,
            }
        };

        if removed {
            self.selections.write().remove(&reference.key);
            debug!(key = %reference.key, "Released callback");
        }
        removed
    }

    /// Returns `true` if a callback is registered for `key`.
    pub fn has(&self, key: &Key) -> bool {
        self.callbacks.read().contains_key(key)
    }

    /// Returns the callback registered for `key`.
    pub fn callback(&self, key: &Key) -> Option<Callback> {
        self.callbacks
            .read()
            .get(key)
            .map(|entry| Arc::clone(&entry.callback))
    }

    fn is_current(&self, key: &Key, id: u64) -> bool {
        self.callbacks
            .read()
            .get(key)
            .is_some_and(|entry| entry.id == id)
    }

    /// Stores the latest values of select menu `component_id` on `key`.
    pub fn record_selection(&self, key: &Key, component_id: &str, values: Vec<String>) {
        trace!(key = %key, component = component_id, count = values.len(), "Recorded selection");
        self.selections
            .write()
            .entry(key.clone())
            .or_default()
            .insert(component_id.to_string(), values);
    }

    /// Returns the last-seen selections on `key`, empty if none.
    pub fn selections(&self, key: &Key) -> HashMap<String, Vec<String>> {
        self.selections.read().get(key).cloned().unwrap_or_default()
    }

    /// Marks `key` as locked. Returns `false` if it already was.
    pub fn lock(&self, key: &Key) -> bool {
        self.locks.lock().insert(key.clone())
    }

    /// Clears the lock on `key`.
    pub fn unlock(&self, key: &Key) {
        self.locks.lock().remove(key);
    }

    /// Returns `true` if `key` is locked.
    pub fn is_locked(&self, key: &Key) -> bool {
        self.locks.lock().contains(key)
    }

    /// Locks `key` and returns a guard that unlocks it on drop.
    ///
    /// Returns `None` if the key was already locked.
    pub fn try_lock(self: &Arc<Self>, key: &Key) -> Option<KeyLock> {
        self.lock(key).then(|| KeyLock {
            registry: Arc::clone(self),
            key: key.clone(),
        })
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Returns all registered keys.
    pub fn keys(&self) -> Vec<Key> {
        self.callbacks.read().keys().cloned().collect()
    }

    /// Drops every registration, lock and selection.
    ///
    /// All currently active interactive messages stop responding.
    pub fn clear(&self) {
        let count = {
            let mut callbacks = self.callbacks.write();
            let count = callbacks.len();
            callbacks.clear();
            count
        };
        self.locks.lock().clear();
        self.selections.write().clear();

        debug!(count, "Cleared event registry");
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("callbacks", &self.callbacks.read().len())
            .field("locked", &self.locks.lock().len())
            .finish()
    }
}

// ============================================================================
// ActionReference
// ============================================================================

/// A non-owning handle to one registration.
///
/// Holding a reference never keeps a callback alive: it stores the key, the
/// registration id and a weak pointer to the registry, nothing else. Once the
/// registration is gone (unregistered, replaced or cleared) every accessor
/// reports it as absent.
#[derive(Clone)]
pub struct ActionReference {
    key: Key,
    id: u64,
    registry: Weak<EventRegistry>,
}

impl ActionReference {
    /// The key this reference was created for, regardless of validity.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns `true` while the registration is still the current one.
    pub fn is_valid(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.is_current(&self.key, self.id))
    }

    /// Returns the key if the registration is still live, `None` otherwise.
    pub fn get(&self) -> Option<&Key> {
        self.is_valid().then_some(&self.key)
    }
}

impl fmt::Debug for ActionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionReference")
            .field("key", &self.key)
            .field("valid", &self.is_valid())
            .finish()
    }
}

// ============================================================================
// KeyLock
// ============================================================================

/// Guard returned by [`EventRegistry::try_lock`]; unlocks on drop.
pub struct KeyLock {
    registry: Arc<EventRegistry>,
    key: Key,
}

impl KeyLock {
    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        self.registry.unlock(&self.key);
    }
}
