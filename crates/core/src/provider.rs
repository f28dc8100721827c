// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notes state holder.
//!
//! [`NotesProvider`] keeps a single live view of one owner's notes. It
//! subscribes to [`NotesRepository::stream_notes`], mirrors each snapshot
//! into [`NotesState`], and notifies registered observers synchronously on
//! every state transition.
//!
//! # Consistency model
//!
//! The live subscription is the only thing that changes `notes`. The write
//! operations ([`NotesProvider::add_note`] and friends) report success or
//! failure but never touch the list; their effect arrives later as a new
//! snapshot. With no active subscription a successful write stays invisible
//! until [`NotesProvider::start_listening_to_notes`] is called.
//!
//! Errors are sticky: a later successful snapshot does not clear
//! `error_message`. Only [`NotesProvider::clear_error`], a new subscription,
//! a new fetch, a write, or [`NotesProvider::clear_notes`] clears it.
//!
//! # Subscriptions
//!
//! At most one subscription is active. Each one runs as a task on the
//! ambient tokio runtime and is tagged with a generation number. Cancelling
//! (re-subscribing, clearing, or dropping the provider) aborts the task and
//! advances the generation under the state lock, so an event already in
//! flight from a superseded subscription is discarded rather than applied.
//!
//! # Observer callbacks
//!
//! Each transition queues a snapshot of the resulting state. Snapshots are
//! delivered in transition order, one at a time, and no provider lock is
//! held while callbacks run. A callback may therefore read or mutate the
//! provider and register or remove observers; a transition it causes is
//! delivered after the current notification finishes. Because delivery is
//! queued, a callback can see a snapshot that is older than `state()`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::note::Note;
use crate::observer::{ObserverId, Observers};
use crate::repository::{NoteStream, NotesRepository};

/// Observable snapshot of the provider's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesState {
    /// Latest list delivered for the listened owner, replaced wholesale.
    pub notes: Vec<Note>,
    /// True from subscription (or fetch) start until its first result.
    pub is_loading: bool,
    /// Description of the last failure; empty when there is none.
    pub error_message: String,
}

/// Handle to a running notes subscription.
pub struct Subscription {
    generation: u64,
    owner_id: String,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Returns the owner this subscription listens to.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Stops the subscription immediately. No events are drained.
    pub fn cancel(self) {
        debug!(
            "cancelling notes subscription {} for owner {}",
            self.generation, self.owner_id
        );
        self.task.abort();
    }
}

/// Mutable state guarded by one lock.
struct Inner {
    state: NotesState,
    /// Advanced on every cancellation; events tagged with an older value are stale.
    generation: u64,
    subscription: Option<Subscription>,
    /// Owner whose notes `state.notes` holds.
    owner: Option<String>,
    /// Snapshots awaiting delivery to observers, oldest first.
    pending: VecDeque<NotesState>,
    /// True while some thread is delivering `pending`.
    delivering: bool,
    disposed: bool,
}

impl Inner {
    fn cancel_subscription(&mut self) {
        self.generation += 1;
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.disposed && self.generation == generation
    }
}

/// State shared between the provider and its subscription task.
struct Shared {
    inner: Mutex<Inner>,
    observers: Observers<NotesState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies a transition and notifies observers with the resulting state.
    ///
    /// The transition returns `None` to skip it entirely (stale event, or
    /// nothing to change); observers are then not notified.
    fn transition<T>(&self, f: impl FnOnce(&mut Inner) -> Option<T>) -> Option<T> {
        let result = {
            let mut inner = self.lock();
            if inner.disposed {
                return None;
            }
            let result = f(&mut inner)?;
            let snapshot = inner.state.clone();
            inner.pending.push_back(snapshot);
            result
        };
        self.deliver();
        Some(result)
    }

    /// Delivers queued snapshots unless another call is already doing so,
    /// in which case that call picks them up.
    fn deliver(&self) {
        loop {
            let snapshot = {
                let mut inner = self.lock();
                if inner.delivering {
                    return;
                }
                match inner.pending.pop_front() {
                    Some(snapshot) => {
                        inner.delivering = true;
                        snapshot
                    }
                    None => return,
                }
            };
            self.observers.notify(&snapshot);
            self.lock().delivering = false;
        }
    }

    /// Records a failed load: sets the message and clears loading.
    fn record_error(&self, generation: Option<u64>, err: &Error) {
        warn!("loading notes failed: {}", err);
        let message = err.to_string();
        self.transition(|inner| {
            if generation.is_some_and(|g| !inner.is_current(g)) {
                return None;
            }
            inner.state.error_message = message;
            inner.state.is_loading = false;
            Some(())
        });
    }
}

/// State holder bridging a repository's live notes stream to observers.
pub struct NotesProvider<R: NotesRepository> {
    repository: R,
    shared: Arc<Shared>,
}

impl<R: NotesRepository> NotesProvider<R> {
    /// Creates a provider with empty state and no subscription.
    pub fn new(repository: R) -> Self {
        NotesProvider {
            repository,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: NotesState::default(),
                    generation: 0,
                    subscription: None,
                    owner: None,
                    pending: VecDeque::new(),
                    delivering: false,
                    disposed: false,
                }),
                observers: Observers::new(),
            }),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> NotesState {
        self.shared.lock().state.clone()
    }

    /// Returns the current notes.
    pub fn notes(&self) -> Vec<Note> {
        self.shared.lock().state.notes.clone()
    }

    /// Returns true while a subscription or fetch awaits its first result.
    pub fn is_loading(&self) -> bool {
        self.shared.lock().state.is_loading
    }

    /// Returns the last failure's description, or an empty string.
    pub fn error_message(&self) -> String {
        self.shared.lock().state.error_message.clone()
    }

    /// Returns true if a subscription is active.
    pub fn is_listening(&self) -> bool {
        self.shared.lock().subscription.is_some()
    }

    /// Returns the owner of the active subscription.
    pub fn listening_owner(&self) -> Option<String> {
        self.shared
            .lock()
            .subscription
            .as_ref()
            .map(|subscription| subscription.owner_id().to_string())
    }

    /// Registers a callback invoked with the new state after every change.
    pub fn observe<F>(&self, callback: F) -> ObserverId
    where
        F: FnMut(&NotesState) + Send + 'static,
    {
        self.shared.observers.register(callback)
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.shared.observers.unregister(id)
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.shared.observers.len()
    }

    /// Subscribes to the owner's live notes, replacing any prior subscription.
    ///
    /// Sets loading and clears the error, then opens the stream. Notes of a
    /// different owner are dropped at once; re-listening to the same owner
    /// keeps the current list until the new stream delivers. Each list
    /// the stream delivers replaces `notes` and clears loading. A stream
    /// error is recorded but leaves the subscription open. A failure to open
    /// the stream at all is recorded the same way.
    ///
    /// The subscription runs on the current tokio runtime; calling this
    /// outside one is recorded as [`Error::NoRuntime`].
    pub fn start_listening_to_notes(&self, owner_id: &str) {
        let generation = self.shared.transition(|inner| {
            inner.cancel_subscription();
            if inner.owner.as_deref() != Some(owner_id) {
                inner.state.notes.clear();
                inner.owner = Some(owner_id.to_string());
            }
            inner.state.is_loading = true;
            inner.state.error_message.clear();
            Some(inner.generation)
        });
        let Some(generation) = generation else {
            return;
        };
        debug!("listening to notes for owner {} ({})", owner_id, generation);

        let stream = match self.repository.stream_notes(owner_id) {
            Ok(stream) => stream,
            Err(e) => {
                self.shared.record_error(Some(generation), &e);
                return;
            }
        };
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                self.shared.record_error(Some(generation), &Error::NoRuntime);
                return;
            }
        };

        let task = runtime.spawn(pump(Arc::clone(&self.shared), generation, stream));
        let subscription = Subscription {
            generation,
            owner_id: owner_id.to_string(),
            task,
        };

        let mut inner = self.shared.lock();
        if inner.is_current(generation) {
            inner.subscription = Some(subscription);
        } else {
            subscription.cancel();
        }
    }

    /// Fetches the owner's notes once, without touching the subscription.
    pub async fn fetch_notes(&self, owner_id: &str) {
        self.shared.transition(|inner| {
            inner.state.is_loading = true;
            inner.state.error_message.clear();
            Some(())
        });

        match self.repository.fetch_notes(owner_id).await {
            Ok(notes) => {
                debug!("fetched {} notes for owner {}", notes.len(), owner_id);
                self.shared.transition(|inner| {
                    inner.state.notes = notes;
                    inner.state.is_loading = false;
                    inner.owner = Some(owner_id.to_string());
                    Some(())
                });
            }
            Err(e) => self.shared.record_error(None, &e),
        }
    }

    /// Creates a note. Returns true if the repository accepted it.
    pub async fn add_note(&self, text: &str, owner_id: &str) -> bool {
        self.clear_error_before_write();
        let result = self.repository.add_note(text, owner_id).await;
        self.finish_write(result)
    }

    /// Replaces a note's text. Returns true if the repository accepted it.
    pub async fn update_note(&self, note_id: &str, text: &str, owner_id: &str) -> bool {
        debug!("updating note {} for owner {}", note_id, owner_id);
        self.clear_error_before_write();
        let result = self.repository.update_note(note_id, text).await;
        self.finish_write(result)
    }

    /// Deletes a note. Returns true if the repository accepted it.
    pub async fn delete_note(&self, note_id: &str, owner_id: &str) -> bool {
        debug!("deleting note {} for owner {}", note_id, owner_id);
        self.clear_error_before_write();
        let result = self.repository.delete_note(note_id).await;
        self.finish_write(result)
    }

    /// Cancels the subscription and resets to the empty state.
    ///
    /// Used on logout so one user's notes never outlive their session.
    pub fn clear_notes(&self) {
        self.shared.transition(|inner| {
            inner.cancel_subscription();
            inner.state = NotesState::default();
            inner.owner = None;
            Some(())
        });
    }

    /// Clears the error message, leaving notes and loading unchanged.
    pub fn clear_error(&self) {
        self.shared.transition(|inner| {
            inner.state.error_message.clear();
            Some(())
        });
    }

    fn clear_error_before_write(&self) {
        self.shared.transition(|inner| {
            if inner.state.error_message.is_empty() {
                return None;
            }
            inner.state.error_message.clear();
            Some(())
        });
    }

    fn finish_write(&self, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("notes write failed: {}", e);
                let message = e.to_string();
                self.shared.transition(|inner| {
                    inner.state.error_message = message;
                    Some(())
                });
                false
            }
        }
    }
}

impl<R: NotesRepository> Drop for NotesProvider<R> {
    fn drop(&mut self) {
        {
            let mut inner = self.shared.lock();
            inner.disposed = true;
            inner.cancel_subscription();
        }
        self.shared.observers.clear();
    }
}

/// Applies stream events in delivery order until the stream ends or the
/// subscription is superseded.
async fn pump(shared: Arc<Shared>, generation: u64, mut stream: NoteStream) {
    while let Some(event) = stream.next().await {
        let applied = match event {
            Ok(notes) => shared.transition(|inner| {
                if !inner.is_current(generation) {
                    return None;
                }
                debug!("notes snapshot: {} notes", notes.len());
                inner.state.notes = notes;
                inner.state.is_loading = false;
                Some(())
            }),
            Err(e) => {
                warn!("notes stream error: {}", e);
                let message = e.to_string();
                shared.transition(|inner| {
                    if !inner.is_current(generation) {
                        return None;
                    }
                    inner.state.error_message = message;
                    inner.state.is_loading = false;
                    Some(())
                })
            }
        };
        if applied.is_none() {
            break;
        }
    }
    debug!("notes subscription {} finished", generation);
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
