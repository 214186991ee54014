use std::{
    cell::{Cell, RefCell},
    num::NonZeroU64,
    rc::Rc,
};

use smallvec::SmallVec;

/// Identifies one observer registered with an [`EventSource`].
///
/// Ids are never reused by the source that issued them, so unsubscribing with
/// a stale id is always a harmless no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(NonZeroU64);

type Callback<T> = Rc<dyn Fn(&T)>;

struct Observer<T: ?Sized> {
    id: SubscriptionId,
    callback: Callback<T>,
}

/// An ordered list of observers for one kind of notification.
///
/// Observers are called in subscription order. The list is snapshotted before
/// each emission, so observers may freely subscribe or unsubscribe (themselves
/// or others) from inside a callback:
///
/// - observers added during an emission are first called on the next one.
/// - observers removed during an emission are not called again, even if they
///   were part of the snapshot.
///
/// This is a single-threaded structure; it is meant to live on the thread that
/// pumps the platform event loop.
pub struct EventSource<T: ?Sized> {
    next_id: Cell<u64>,
    observers: RefCell<Vec<Observer<T>>>,
}

impl<T: ?Sized> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> EventSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Registers `callback` and returns the id needed to remove it again.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let raw = self.next_id.get();
        self.next_id.set(raw + 1);

        // `next_id` starts at 1 and only grows.
        let id = SubscriptionId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN));

        self.observers.borrow_mut().push(Observer {
            id,
            callback: Rc::new(callback),
        });

        id
    }

    /// Removes an observer. Returns false if it was not subscribed, which
    /// includes removing the same id twice.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        if let Some(index) = observers.iter().position(|o| o.id == id) {
            observers.remove(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.observers.borrow().iter().any(|o| o.id == id)
    }

    /// Removes every observer.
    pub fn clear(&self) {
        self.observers.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    /// Calls every observer with `value`.
    pub fn emit(&self, value: &T) {
        let snapshot: SmallVec<[(SubscriptionId, Callback<T>); 4]> = self
            .observers
            .borrow()
            .iter()
            .map(|o| (o.id, o.callback.clone()))
            .collect();

        for (id, callback) in snapshot {
            if self.is_subscribed(id) {
                (*callback)(value);
            }
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSource")
            .field("observers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_in_subscription_order() {
        let source = EventSource::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = log.clone();
            source.subscribe(move |v| log.borrow_mut().push((tag, *v)));
        }

        source.emit(&7);

        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7), ("c", 7)]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let source = EventSource::<()>::new();
        let count = Rc::new(Cell::new(0));

        let id = {
            let count = count.clone();
            source.subscribe(move |_| count.set(count.get() + 1))
        };

        source.emit(&());
        assert!(source.unsubscribe(id));
        assert!(!source.unsubscribe(id));
        source.emit(&());

        assert_eq!(count.get(), 1);
        assert!(source.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let source = EventSource::<()>::new();

        let a = source.subscribe(|_| {});
        source.unsubscribe(a);
        let b = source.subscribe(|_| {});

        assert_ne!(a, b);
        assert!(!source.unsubscribe(a));
        assert!(source.is_subscribed(b));
    }

    #[test]
    fn reentrant_subscribe_and_unsubscribe() {
        let source = Rc::new(EventSource::<()>::new());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(Cell::new(None));

        {
            let source_ref = Rc::downgrade(&source);
            let calls = calls.clone();
            let second = second.clone();
            source.subscribe(move |_| {
                calls.borrow_mut().push("first");
                let source = source_ref.upgrade().unwrap();

                // Remove the second observer before it runs, and add a third.
                if let Some(id) = second.take() {
                    source.unsubscribe(id);
                }
                let calls = calls.clone();
                source.subscribe(move |_| calls.borrow_mut().push("late"));
            });
        }

        {
            let calls = calls.clone();
            second.set(Some(source.subscribe(move |_| calls.borrow_mut().push("second"))));
        }

        source.emit(&());
        assert_eq!(*calls.borrow(), vec!["first"]);

        source.emit(&());
        assert_eq!(*calls.borrow(), vec!["first", "first", "late"]);
    }

    #[test]
    fn unsized_payload() {
        let source = EventSource::<[u8]>::new();
        let seen = Rc::new(Cell::new(0));

        {
            let seen = seen.clone();
            source.subscribe(move |bytes| seen.set(bytes.len()));
        }

        source.emit(&[1, 2, 3][..]);
        assert_eq!(seen.get(), 3);
    }
}
