//! Observer registration for store snapshots.
//!
//! Stores publish an immutable snapshot of their collection after every
//! mutation. Observers are plain callbacks invoked synchronously in
//! registration order; unsubscribe with the id handed back at registration.
//! Callbacks must not call back into the publishing store.

use std::sync::{Mutex, MutexGuard};

pub type ObserverId = u64;

pub struct Observers<T> {
    next_id: ObserverId,
    entries: Vec<(ObserverId, Box<dyn Fn(&T) + Send>)>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl Fn(&T) + Send + 'static) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invoke every observer, in registration order.
    pub fn notify(&self, value: &T) {
        for (_, observer) in &self.entries {
            observer(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a mutex, recovering the inner value if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn notifies_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers = Observers::new();

        let first = Arc::clone(&seen);
        observers.subscribe(move |value: &u32| first.lock().unwrap().push(("first", *value)));
        let second = Arc::clone(&seen);
        observers.subscribe(move |value: &u32| second.lock().unwrap().push(("second", *value)));

        observers.notify(&7);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[("first", 7), ("second", 7)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let seen = Arc::new(Mutex::new(0u32));
        let mut observers = Observers::new();

        let counter = Arc::clone(&seen);
        let id = observers.subscribe(move |_: &()| *counter.lock().unwrap() += 1);

        observers.notify(&());
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&());

        assert_eq!(*seen.lock().unwrap(), 1);
        assert!(observers.is_empty());
    }
}
