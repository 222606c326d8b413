#![forbid(unsafe_code)]

//! Single-value cell with synchronous change notification.
//!
//! # Design
//!
//! [`Observable<T>`] keeps its value and listener list in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). Cloning a handle shares
//! both. A [`Subscription`] guard is handed out per listener; dropping it (or
//! calling [`Subscription::unsubscribe`]) removes the listener immediately.
//!
//! # Invariants
//!
//! 1. `set(v)` where `v == current` is a no-op: no version bump, no
//!    notification.
//! 2. `version` increments by exactly 1 on each value-changing mutation.
//! 3. Listeners run synchronously inside `set`, in registration order.
//! 4. A listener removed during a notification round is not invoked for
//!    the rest of that round. Removing the listener that is currently
//!    running is allowed.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: calling `set()` from a listener starts a nested
//!   round with the newer value. The outer round stops there: the nested
//!   round already reached every listener, so nobody sees a stale value
//!   after the newer one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug_span;
use web_time::Instant;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

impl<T> Inner<T> {
    fn is_listening(&self, id: u64) -> bool {
        self.listeners.iter().any(|(lid, _)| *lid == id)
    }
}

/// A shared value whose changes are pushed to listeners.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not call `set` on this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify listeners if it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Mutate the value in place; listeners run only if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            if inner.value == before {
                return false;
            }
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Register `listener`; it runs with the new value after every change
    /// until the returned guard is dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Rc::new(listener)));
            id
        };
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Alias of [`subscribe`](Self::subscribe).
    pub fn listen(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe(listener)
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe or unsubscribe while we iterate.
        let (value, version, listeners): (T, u64, Vec<(u64, Listener<T>)>) = {
            let inner = self.inner.borrow();
            (inner.value.clone(), inner.version, inner.listeners.clone())
        };
        if listeners.is_empty() {
            return;
        }

        let started = Instant::now();
        let span = debug_span!(
            "observable.notify",
            version,
            listeners = listeners.len() as u64,
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        for (id, listener) in &listeners {
            {
                let inner = self.inner.borrow();
                // A listener set a newer value; its round has notified everyone.
                if inner.version != version {
                    break;
                }
                if !inner.is_listening(*id) {
                    continue;
                }
            }
            listener(&value);
        }

        span.record("duration_us", started.elapsed().as_micros() as u64);
    }
}

/// Guard for one registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now. Same as dropping the guard.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}
