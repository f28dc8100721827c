// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notes repository.
//!
//! [`NotesRepository`] is the boundary the state holder depends on.
//! [`StoreRepository`] implements it as a thin pass-through over a
//! [`DocumentStore`]: one collection, filtered by owner, ordered by creation
//! time.

use std::pin::Pin;

use chrono::Utc;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::note::{self, Note};
use crate::store::{BoxFuture, Document, DocumentStore, Fields, Query};

/// Live sequence of complete note lists for one owner.
pub type NoteStream = Pin<Box<dyn Stream<Item = Result<Vec<Note>>> + Send>>;

/// Access to one owner's notes.
///
/// Every operation may fail. [`NotesRepository::stream_notes`] may fail
/// synchronously while opening the subscription.
pub trait NotesRepository: Send + Sync + 'static {
    /// Opens a live stream of the owner's notes. Each item replaces the
    /// previous list entirely.
    fn stream_notes(&self, owner_id: &str) -> Result<NoteStream>;

    /// Fetches the owner's notes once.
    fn fetch_notes(&self, owner_id: &str) -> BoxFuture<'_, Result<Vec<Note>>>;

    /// Creates a note for the owner.
    fn add_note(&self, text: &str, owner_id: &str) -> BoxFuture<'_, Result<()>>;

    /// Replaces a note's text.
    fn update_note(&self, note_id: &str, text: &str) -> BoxFuture<'_, Result<()>>;

    /// Deletes a note.
    fn delete_note(&self, note_id: &str) -> BoxFuture<'_, Result<()>>;
}

/// [`NotesRepository`] backed by a document store client.
pub struct StoreRepository<S: DocumentStore> {
    store: S,
    config: Config,
}

impl<S: DocumentStore> StoreRepository<S> {
    /// Creates a repository over the given store client.
    pub fn new(store: S, config: Config) -> Self {
        StoreRepository { store, config }
    }

    /// Returns the underlying store client.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn owner_query(&self, owner_id: &str) -> Result<Query> {
        if owner_id.is_empty() {
            return Err(Error::InvalidInput("owner id must not be empty".to_string()));
        }
        Ok(Query::collection(&self.config.collection)
            .where_eq(note::FIELD_OWNER, owner_id)
            .order_by(note::FIELD_CREATED_AT, self.config.order.direction()))
    }
}

fn decode_all(docs: Vec<Document>) -> Result<Vec<Note>> {
    docs.iter().map(Note::from_document).collect()
}

impl<S: DocumentStore> NotesRepository for StoreRepository<S> {
    fn stream_notes(&self, owner_id: &str) -> Result<NoteStream> {
        let query = self.owner_query(owner_id)?;
        debug!("watching {} for owner {}", query.collection, owner_id);
        let docs = self.store.watch(&query)?;
        Ok(Box::pin(docs.map(|item| item.and_then(decode_all))))
    }

    fn fetch_notes(&self, owner_id: &str) -> BoxFuture<'_, Result<Vec<Note>>> {
        let query = self.owner_query(owner_id);
        Box::pin(async move {
            let query = query?;
            let docs = self.store.get(&query).await?;
            decode_all(docs)
        })
    }

    fn add_note(&self, text: &str, owner_id: &str) -> BoxFuture<'_, Result<()>> {
        let fields = Note::new(text, owner_id, Utc::now()).to_map();
        Box::pin(async move {
            let id = self.store.insert(&self.config.collection, fields).await?;
            debug!("added note {}", id);
            Ok(())
        })
    }

    fn update_note(&self, note_id: &str, text: &str) -> BoxFuture<'_, Result<()>> {
        let note_id = note_id.to_string();
        let mut fields = Fields::new();
        fields.insert(note::FIELD_TEXT.into(), Value::String(text.to_string()));
        fields.insert(note::FIELD_UPDATED_AT.into(), note::timestamp_value(Utc::now()));
        Box::pin(async move {
            self.store
                .update(&self.config.collection, &note_id, fields)
                .await?;
            debug!("updated note {}", note_id);
            Ok(())
        })
    }

    fn delete_note(&self, note_id: &str) -> BoxFuture<'_, Result<()>> {
        let note_id = note_id.to_string();
        Box::pin(async move {
            self.store.delete(&self.config.collection, &note_id).await?;
            debug!("deleted note {}", note_id);
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
