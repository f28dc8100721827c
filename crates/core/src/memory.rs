// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process document store.
//!
//! Keeps every collection in memory and fans changes out to live queries
//! over a broadcast channel. Used by tests and the jotter REPL in place of
//! a hosted backend. There is no persistence: dropping the last clone drops
//! the data.
//!
//! The store can be put into a fault state to rehearse backend failures:
//! while faulted every operation fails with [`Error::Backend`], and open live
//! queries receive the fault as a stream error but stay open.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{BoxFuture, Document, DocumentStore, DocumentStream, Fields, Query};

/// Notices published to live queries.
#[derive(Debug, Clone)]
enum Notice {
    /// A document in the named collection was written.
    Changed(String),
    /// The store entered the fault state.
    Fault(String),
    /// The store left the fault state.
    Recovered,
}

/// Shared in-memory document store. Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    /// Documents per collection, in insertion order.
    collections: Mutex<HashMap<String, Vec<Document>>>,
    /// Current fault message, if faulted.
    fault: Mutex<Option<String>>,
    /// Source of document ids.
    next_id: AtomicU64,
    /// Change fanout to live queries.
    notices: broadcast::Sender<Notice>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notices, _) = broadcast::channel(256);
        MemoryStore {
            inner: Arc::new(MemoryInner {
                collections: Mutex::new(HashMap::new()),
                fault: Mutex::new(None),
                next_id: AtomicU64::new(1),
                notices,
            }),
        }
    }

    /// Puts the store into the fault state with the given message.
    pub fn fail_with(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("memory store faulted: {}", message);
        *lock(&self.inner.fault) = Some(message.clone());
        let _ = self.inner.notices.send(Notice::Fault(message));
    }

    /// Leaves the fault state. Live queries re-emit their current results.
    pub fn recover(&self) {
        if lock(&self.inner.fault).take().is_some() {
            debug!("memory store recovered");
            let _ = self.inner.notices.send(Notice::Recovered);
        }
    }

    /// Returns the number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        lock(&self.inner.collections)
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Returns true if `collection` holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check_fault(&self) -> Result<()> {
        match lock(&self.inner.fault).as_ref() {
            Some(message) => Err(Error::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn run(&self, query: &Query) -> Vec<Document> {
        let collections = lock(&self.inner.collections);
        let mut docs: Vec<Document> = collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.matches(&doc.fields))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by(|a, b| query.compare(&a.fields, &b.fields));
        docs
    }

    fn publish_change(&self, collection: &str) {
        let _ = self
            .inner
            .notices
            .send(Notice::Changed(collection.to_string()));
    }
}

/// State carried between items of a live query stream.
struct Watch {
    store: MemoryStore,
    query: Query,
    notices: broadcast::Receiver<Notice>,
    primed: bool,
}

impl Watch {
    /// Waits for the next notice relevant to this query.
    ///
    /// Returns `None` once the store can publish no more notices.
    async fn next_item(&mut self) -> Option<Result<Vec<Document>>> {
        if !self.primed {
            self.primed = true;
            return Some(Ok(self.store.run(&self.query)));
        }

        loop {
            match self.notices.recv().await {
                Ok(Notice::Changed(collection)) if collection == self.query.collection => break,
                Ok(Notice::Changed(_)) => continue,
                Ok(Notice::Fault(message)) => return Some(Err(Error::Backend(message))),
                Ok(Notice::Recovered) => break,
                Err(RecvError::Lagged(n)) => {
                    // Results are complete sets, so re-running the query catches up.
                    debug!("live query on {} lagged by {} notices", self.query.collection, n);
                    break;
                }
                Err(RecvError::Closed) => return None,
            }
        }

        Some(Ok(self.store.run(&self.query)))
    }
}

impl DocumentStore for MemoryStore {
    fn watch(&self, query: &Query) -> Result<DocumentStream> {
        self.check_fault()?;

        // Subscribe before the first query so no write can slip between them.
        let watch = Watch {
            store: self.clone(),
            query: query.clone(),
            notices: self.inner.notices.subscribe(),
            primed: false,
        };

        Ok(Box::pin(futures_util::stream::unfold(
            watch,
            |mut watch| async move {
                let item = watch.next_item().await?;
                Some((item, watch))
            },
        )))
    }

    fn get(&self, query: &Query) -> BoxFuture<'_, Result<Vec<Document>>> {
        let query = query.clone();
        Box::pin(async move {
            self.check_fault()?;
            Ok(self.run(&query))
        })
    }

    fn insert(&self, collection: &str, fields: Fields) -> BoxFuture<'_, Result<String>> {
        let collection = collection.to_string();
        Box::pin(async move {
            self.check_fault()?;
            let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            let id = format!("doc-{:06}", n);
            lock(&self.inner.collections)
                .entry(collection.clone())
                .or_default()
                .push(Document::new(id.clone(), fields));
            self.publish_change(&collection);
            Ok(id)
        })
    }

    fn update(&self, collection: &str, id: &str, fields: Fields) -> BoxFuture<'_, Result<()>> {
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            self.check_fault()?;
            {
                let mut collections = lock(&self.inner.collections);
                let doc = collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
                    .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, id)))?;
                doc.fields.extend(fields);
            }
            self.publish_change(&collection);
            Ok(())
        })
    }

    fn delete(&self, collection: &str, id: &str) -> BoxFuture<'_, Result<()>> {
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            self.check_fault()?;
            let removed = {
                let mut collections = lock(&self.inner.collections);
                match collections.get_mut(&collection) {
                    Some(docs) => {
                        let before = docs.len();
                        docs.retain(|doc| doc.id != id);
                        docs.len() != before
                    }
                    None => false,
                }
            };
            if removed {
                self.publish_change(&collection);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
