//! Scoped registration of viewport-wide pointer listeners.
//!
//! A gesture keeps receiving move/up events after the pointer leaves the
//! element, so the host attaches listeners to the whole viewport for the
//! gesture's duration. Registrations are held by a [`ListenerGuard`] and
//! released when it drops.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// Identifier of one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host capability for attaching global pointer listeners.
pub trait ListenerRegistry {
    /// Attach move/up listeners and return their registration id.
    fn register(&self) -> ListenerId;

    /// Detach a registration. Unknown ids are ignored.
    fn unregister(&self, id: ListenerId);
}

/// Owns one registration and releases it on drop.
pub struct ListenerGuard {
    registry: Rc<dyn ListenerRegistry>,
    id: ListenerId,
}

impl ListenerGuard {
    /// Register with `registry` for as long as the guard lives.
    pub fn acquire(registry: Rc<dyn ListenerRegistry>) -> Self {
        let id = registry.register();
        log::debug!("pointer listeners attached ({:?})", id);
        Self { registry, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
        log::debug!("pointer listeners detached ({:?})", self.id);
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

/// In-process registry that tracks live registrations.
#[derive(Debug, Default)]
pub struct LocalListenerRegistry {
    next_id: Cell<u64>,
    live: RefCell<HashSet<ListenerId>>,
}

impl LocalListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations currently attached.
    pub fn active_count(&self) -> usize {
        self.live.borrow().len()
    }
}

impl ListenerRegistry for LocalListenerRegistry {
    fn register(&self) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.live.borrow_mut().insert(id);
        id
    }

    fn unregister(&self, id: ListenerId) {
        self.live.borrow_mut().remove(&id);
    }
}
