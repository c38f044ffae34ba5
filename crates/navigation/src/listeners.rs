use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

trait Detach {
    fn detach(&self, id: u64) -> bool;
}

/// Listeners called synchronously in subscription order.
///
/// `emit` snapshots the list first, so a listener may subscribe, unsubscribe
/// or emit again without hitting a `RefCell` borrow. A listener removed
/// during an emit still sees that emit.
pub(crate) struct ListenerSet<T: ?Sized> {
    entries: RefCell<Vec<(u64, Listener<T>)>>,
    next_id: Cell<u64>,
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<T: ?Sized + 'static> ListenerSet<T> {
    pub(crate) fn subscribe(self: &Rc<Self>, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, Rc::new(listener)));
        let set: Rc<dyn Detach> = self.clone();
        Subscription {
            id,
            set: Rc::downgrade(&set),
        }
    }

    pub(crate) fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl<T: ?Sized> Detach for ListenerSet<T> {
    fn detach(&self, id: u64) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(i, _)| *i != id);
        entries.len() != before
    }
}

/// Handle returned by `subscribe`. Dropping it leaves the listener attached;
/// call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    set: Weak<dyn Detach>,
}

impl Subscription {
    /// Returns `false` if the listener was already gone.
    pub fn unsubscribe(self) -> bool {
        self.set.upgrade().is_some_and(|set| set.detach(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ListenerSet;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emits_in_order_and_detaches() {
        let set: Rc<ListenerSet<u32>> = Rc::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s1 = seen.clone();
        let first = set.subscribe(move |v| s1.borrow_mut().push(("a", *v)));
        let s2 = seen.clone();
        let _second = set.subscribe(move |v| s2.borrow_mut().push(("b", *v)));

        set.emit(&1);
        assert!(first.unsubscribe());
        set.emit(&2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let set: Rc<ListenerSet<u32>> = Rc::default();
        let inner = Rc::clone(&set);
        let _s = set.subscribe(move |_| {
            let _ = inner.subscribe(|_| {});
        });
        set.emit(&0);
        assert_eq!(set.len(), 2);
    }
}
