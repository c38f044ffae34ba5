use std::cell::RefCell;
use std::rc::Rc;

use crate::listeners::{ListenerSet, Subscription};
use crate::state::{NavigationState, NavigationUpdate};

/// Shared owner of the current [`NavigationState`].
///
/// Cloning yields another handle to the same store. Updates replace the
/// whole state; listeners run synchronously after the replacement, so they
/// never observe a half-applied update.
#[derive(Clone, Default)]
pub struct NavigationStateStore {
    state: Rc<RefCell<NavigationState>>,
    listeners: Rc<ListenerSet<NavigationState>>,
}

impl std::fmt::Debug for NavigationStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationStateStore")
            .field("state", &*self.state.borrow())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NavigationStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: NavigationState) -> Self {
        let store = Self::default();
        *store.state.borrow_mut() = state;
        store
    }

    pub fn current(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    /// Replaces the state and notifies listeners. Returns `false`, without
    /// notifying, when the resulting state equals the current one.
    pub fn apply(&self, update: impl Into<NavigationUpdate>) -> bool {
        let next = NavigationState::from_update(update.into());
        {
            let mut state = self.state.borrow_mut();
            if *state == next {
                return false;
            }
            *state = next.clone();
        }
        tracing::trace!(state = ?next, "navigation state changed");
        self.listeners.emit(&next);
        true
    }

    pub fn subscribe(&self, listener: impl Fn(&NavigationState) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
