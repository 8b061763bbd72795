//! Host bridge – named-event publish/subscribe between scene and host.
//!
//! ## Role
//!
//! The scene runs inside its own tick loop; the host page runs inside its
//! own lifecycle. Neither holds a reference to the other. Both are handed
//! the same [`EventBus`] at construction time and talk only through it.
//!
//! ## Dispatch contract
//!
//! | Operation | Behaviour                                                        |
//! |-----------|------------------------------------------------------------------|
//! | `on`      | handler runs on every matching `emit`, in registration order     |
//! | `once`    | as `on`, unregistered just before its first invocation           |
//! | `off`     | removes the handler; no-op if already gone                       |
//! | `emit`    | synchronous; zero subscribers = silently dropped                 |
//!
//! Handlers run without the table lock held, so a handler may call back
//! into the bus (`emit`, `on`, `off`). Nested emits simply nest on the
//! stack. The handler list is snapshotted when `emit` starts: handlers
//! added during a dispatch wait for the next one, handlers removed during
//! a dispatch are skipped.
//!
//! A panicking handler is not caught. The table lock is never held while a
//! handler runs, so the bus stays usable after the unwind.

use crate::protocol::{BridgeEvent, EventName};
use log::{debug, trace};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Handler = Arc<dyn Fn(&BridgeEvent) + Send + Sync>;

struct Entry {
    id: u64,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
struct Table {
    next_id: u64,
    disposed: bool,
    handlers: HashMap<EventName, Vec<Entry>>,
}

impl Table {
    fn remove(&mut self, name: EventName, id: u64) -> bool {
        let Some(list) = self.handlers.get_mut(&name) else {
            return false;
        };
        let before = list.len();
        list.retain(|e| e.id != id);
        before != list.len()
    }

    fn contains(&self, name: EventName, id: u64) -> bool {
        self.handlers
            .get(&name)
            .is_some_and(|list| list.iter().any(|e| e.id == id))
    }
}

// ---------------------------------------------------------------------------
// Subscription token
// ---------------------------------------------------------------------------

/// Returned by [`EventBus::on`] / [`EventBus::once`]; pass it to
/// [`EventBus::off`] to unregister.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Subscription {
    name: EventName,
    id: u64,
}

impl Subscription {
    pub fn name(&self) -> EventName {
        self.name
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Cloneable handle to one bridge instance.
#[derive(Clone)]
pub struct EventBus {
    table: Arc<Mutex<Table>>,
}

impl EventBus {
    /// Create a fresh bridge with no handlers.
    pub fn create() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table::default())),
        }
    }

    /// Drop every handler. Afterwards `on`/`once` register nothing and
    /// `emit` delivers nothing.
    pub fn dispose(&self) {
        let mut table = self.table.lock();
        table.handlers.clear();
        table.disposed = true;
        debug!("bridge disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.table.lock().disposed
    }

    pub fn on<F>(&self, name: EventName, handler: F) -> Subscription
    where
        F: Fn(&BridgeEvent) + Send + Sync + 'static,
    {
        self.register(name, false, Arc::new(handler))
    }

    pub fn once<F>(&self, name: EventName, handler: F) -> Subscription
    where
        F: Fn(&BridgeEvent) + Send + Sync + 'static,
    {
        self.register(name, true, Arc::new(handler))
    }

    /// Remove a handler. Returns `false` when it was not registered.
    pub fn off(&self, subscription: &Subscription) -> bool {
        self.table
            .lock()
            .remove(subscription.name, subscription.id)
    }

    /// Deliver `event` to every handler registered for its tag.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&self, event: BridgeEvent) -> usize {
        let name = event.name();
        let snapshot: Vec<(u64, bool, Handler)> = {
            let table = self.table.lock();
            match table.handlers.get(&name) {
                Some(list) => list
                    .iter()
                    .map(|e| (e.id, e.once, e.handler.clone()))
                    .collect(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            trace!("bridge: no subscribers for {}", name);
            return 0;
        }

        let mut delivered = 0;
        for (id, once, handler) in snapshot {
            let live = {
                let mut table = self.table.lock();
                if once {
                    table.remove(name, id)
                } else {
                    table.contains(name, id)
                }
            };
            if !live {
                continue;
            }
            handler(&event);
            delivered += 1;
        }
        delivered
    }

    /// Number of handlers currently registered for `name`.
    pub fn handler_count(&self, name: EventName) -> usize {
        self.table
            .lock()
            .handlers
            .get(&name)
            .map_or(0, |list| list.len())
    }

    fn register(&self, name: EventName, once: bool, handler: Handler) -> Subscription {
        let mut table = self.table.lock();
        table.next_id += 1;
        let id = table.next_id;
        if table.disposed {
            debug!("bridge disposed – ignoring subscription to {}", name);
        } else {
            table
                .handlers
                .entry(name)
                .or_default()
                .push(Entry { id, once, handler });
        }
        Subscription { name, id }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::create()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.lock();
        let counts: HashMap<&str, usize> = table
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("disposed", &table.disposed)
            .field("handlers", &counts)
            .finish()
    }
}
