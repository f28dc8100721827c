// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observer registry for state change notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle returned when registering an observer, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback<T> = Arc<Mutex<dyn FnMut(&T) + Send>>;

/// Registered callbacks, notified in registration order.
///
/// The registry is not locked while callbacks run, so a callback may
/// register or remove observers. Such changes apply from the next
/// notification on.
pub(crate) struct Observers<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ObserverId, Callback<T>)>>,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T> Observers<T> {
    pub(crate) fn new() -> Self {
        Observers {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn register<F>(&self, callback: F) -> ObserverId
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Callback<T> = Arc::new(Mutex::new(callback));
        lock(&self.entries).push((id, callback));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub(crate) fn unregister(&self, id: ObserverId) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Calls every observer registered at the time of the call.
    pub(crate) fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = lock(&self.entries)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            let mut callback = lock(&callback);
            (&mut *callback)(value);
        }
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
