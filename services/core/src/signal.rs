//! Observable cells for reactive recomputation.
//!
//! A [`Signal`] notifies its subscribers synchronously on every write. The
//! signal only keeps a weak handle on each callback; the [`Subscription`]
//! returned by `subscribe` owns it, so dropping the subscription detaches the
//! callback and no reference cycle forms between a signal and the computeds
//! reading it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback = dyn Fn();

struct Inner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Weak<Callback>>>,
}

/// Keeps a callback registered for as long as it lives.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    _callback: Rc<Callback>,
}

/// Anything that can announce changes.
pub trait Observable {
    fn subscribe(&self, callback: Rc<Callback>) -> Subscription;
}

pub struct Signal<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signal").field(&*self.inner.value.borrow()).finish()
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner { value: RefCell::new(value), subscribers: RefCell::new(Vec::new()) }),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.notify();
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        Observable::subscribe(self, Rc::new(callback))
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().iter().filter(|s| s.strong_count() > 0).count()
    }

    fn notify(&self) {
        // Snapshot first: callbacks may read this signal or subscribe to it.
        let live: Vec<Rc<Callback>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|s| s.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback();
        }
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Reads the value without implying a dependency. Identical to `get`
    /// here since dependencies are declared explicitly.
    pub fn peek(&self) -> T {
        self.get()
    }
}

impl<T> Observable for Signal<T> {
    fn subscribe(&self, callback: Rc<Callback>) -> Subscription {
        self.inner.subscribers.borrow_mut().push(Rc::downgrade(&callback));
        Subscription { _callback: callback }
    }
}

/// A signal whose value may be absent, e.g. data that has not been fetched yet.
pub struct OptionalSignal<T> {
    signal: Signal<Option<T>>,
}

impl<T> Clone for OptionalSignal<T> {
    fn clone(&self) -> Self {
        Self { signal: self.signal.clone() }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for OptionalSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OptionalSignal").field(&self.signal).finish()
    }
}

impl<T> Default for OptionalSignal<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> OptionalSignal<T> {
    pub fn new(value: Option<T>) -> Self {
        Self { signal: Signal::new(value) }
    }

    pub fn set_deep_value(&self, value: Option<T>) {
        self.signal.set(value);
    }

    pub fn clear(&self) {
        self.signal.set(None);
    }

    pub fn is_present(&self) -> bool {
        self.signal.with(Option::is_some)
    }

    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        self.signal.with(|value| f(value.as_ref()))
    }
}

impl<T: Clone> OptionalSignal<T> {
    pub fn deep_value(&self) -> Option<T> {
        self.signal.get()
    }

    pub fn peek(&self) -> Option<T> {
        self.signal.peek()
    }

    pub fn value_or(&self, default: T) -> T {
        self.deep_value().unwrap_or(default)
    }
}

impl<T> Observable for OptionalSignal<T> {
    fn subscribe(&self, callback: Rc<Callback>) -> Subscription {
        Observable::subscribe(&self.signal, callback)
    }
}

/// Derived value, recomputed whenever one of its dependencies is written.
pub struct Computed<T> {
    value: Signal<T>,
    _subscriptions: Vec<Subscription>,
}

impl<T: Clone + 'static> Computed<T> {
    pub fn new(dependencies: &[&dyn Observable], compute: impl Fn() -> T + 'static) -> Self {
        let value = Signal::new(compute());
        let compute = Rc::new(compute);
        let subscriptions = dependencies
            .iter()
            .map(|dependency| {
                let target = value.clone();
                let compute = Rc::clone(&compute);
                let callback: Rc<Callback> = Rc::new(move || target.set(compute()));
                dependency.subscribe(callback)
            })
            .collect();
        Self { value, _subscriptions: subscriptions }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Read-only handle on the computed value, usable as a dependency.
    pub fn signal(&self) -> &Signal<T> {
        &self.value
    }
}

impl<T> Observable for Computed<T> {
    fn subscribe(&self, callback: Rc<Callback>) -> Subscription {
        Observable::subscribe(&self.value, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn writes_notify_subscribers_synchronously() {
        let signal = Signal::new(1u32);
        let seen = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&seen);
        let reader = signal.clone();
        let _sub = signal.subscribe(move || sink.set(reader.get()));
        signal.set(5);
        assert_eq!(seen.get(), 5);
        signal.update(|v| *v += 1);
        assert_eq!(seen.get(), 6);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let signal = Signal::new(0);
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let sub = signal.subscribe(move || sink.set(sink.get() + 1));
        signal.set(1);
        drop(sub);
        signal.set(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn computed_chains_follow_their_inputs() {
        let a = Signal::new(2u64);
        let b = OptionalSignal::<u64>::default();
        let sum = {
            let (a, b) = (a.clone(), b.clone());
            Computed::new(&[&a.clone(), &b.clone()], move || a.get() + b.value_or(0))
        };
        let doubled = {
            let sum = sum.signal().clone();
            Computed::new(&[&sum.clone()], move || sum.get() * 2)
        };
        assert_eq!(doubled.get(), 4);
        b.set_deep_value(Some(3));
        assert_eq!(sum.get(), 5);
        assert_eq!(doubled.get(), 10);
        b.clear();
        assert_eq!(doubled.get(), 4);
    }

    #[test]
    fn optional_signal_reports_presence() {
        let s = OptionalSignal::new(Some("x".to_string()));
        assert!(s.is_present());
        assert_eq!(s.peek().as_deref(), Some("x"));
        s.clear();
        assert!(!s.is_present());
        assert_eq!(s.with(|v| v.map(String::len)), None);
    }
}
