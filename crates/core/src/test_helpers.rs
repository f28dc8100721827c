// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: a controllable repository and note fixtures.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::note::Note;
use crate::repository::{NoteStream, NotesRepository};
use crate::store::BoxFuture;

/// Create a persisted test note owned by `owner_id`.
pub fn make_note(id: &str, text: &str, owner_id: &str) -> Note {
    let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
    Note::new(text, owner_id, ts).with_id(id)
}

/// A write call recorded by [`FakeRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Add { text: String, owner_id: String },
    Update { note_id: String, text: String },
    Delete { note_id: String },
}

type Sender = mpsc::UnboundedSender<Result<Vec<Note>>>;

#[derive(Default)]
struct FakeInner {
    /// One event source per opened stream, in open order.
    streams: Vec<(String, Sender)>,
    stream_failure: Option<String>,
    fetch_result: Option<std::result::Result<Vec<Note>, String>>,
    write_failure: Option<String>,
    writes: Vec<Write>,
}

/// Repository double whose streams are driven by the test.
///
/// Clones share state, so a test can keep one clone while the provider owns
/// another.
#[derive(Clone, Default)]
pub struct FakeRepository {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams opened so far.
    pub fn stream_count(&self) -> usize {
        self.inner.lock().unwrap().streams.len()
    }

    /// Owner requested by the `index`th opened stream.
    pub fn stream_owner(&self, index: usize) -> String {
        self.inner.lock().unwrap().streams[index].0.clone()
    }

    /// Deliver a snapshot on the `index`th opened stream.
    pub fn emit(&self, index: usize, notes: Vec<Note>) {
        let inner = self.inner.lock().unwrap();
        // A cancelled subscription has dropped its receiver; that is fine.
        let _ = inner.streams[index].1.send(Ok(notes));
    }

    /// Deliver an error on the `index`th opened stream.
    pub fn emit_error(&self, index: usize, message: &str) {
        let inner = self.inner.lock().unwrap();
        let _ = inner.streams[index]
            .1
            .send(Err(Error::Backend(message.to_string())));
    }

    /// End the `index`th opened stream.
    pub fn close(&self, index: usize) {
        let mut inner = self.inner.lock().unwrap();
        // Dropping the only sender ends the stream; keep a dead one in its slot.
        let (closed, _) = mpsc::unbounded_channel();
        inner.streams[index].1 = closed;
    }

    /// Make the next stream opens fail synchronously.
    pub fn fail_stream_setup(&self, message: &str) {
        self.inner.lock().unwrap().stream_failure = Some(message.to_string());
    }

    /// Set the result returned by `fetch_notes`.
    pub fn set_fetch_result(&self, result: std::result::Result<Vec<Note>, &str>) {
        self.inner.lock().unwrap().fetch_result = Some(result.map_err(str::to_string));
    }

    /// Make writes fail with the given message, or succeed again with `None`.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.inner.lock().unwrap().write_failure = message.map(str::to_string);
    }

    /// Write calls received so far.
    pub fn writes(&self) -> Vec<Write> {
        self.inner.lock().unwrap().writes.clone()
    }

    fn record_write(&self, write: Write) -> BoxFuture<'_, Result<()>> {
        let failure = {
            let mut inner = self.inner.lock().unwrap();
            inner.writes.push(write);
            inner.write_failure.clone()
        };
        Box::pin(async move {
            tokio::task::yield_now().await;
            match failure {
                Some(message) => Err(Error::Backend(message)),
                None => Ok(()),
            }
        })
    }
}

impl NotesRepository for FakeRepository {
    fn stream_notes(&self, owner_id: &str) -> Result<NoteStream> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.stream_failure {
            return Err(Error::Backend(message.clone()));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        inner.streams.push((owner_id.to_string(), sender));
        Ok(Box::pin(futures_util::stream::unfold(
            receiver,
            |mut receiver| async move {
                let item = receiver.recv().await?;
                Some((item, receiver))
            },
        )))
    }

    fn fetch_notes(&self, _owner_id: &str) -> BoxFuture<'_, Result<Vec<Note>>> {
        let result = self
            .inner
            .lock()
            .unwrap()
            .fetch_result
            .clone()
            .unwrap_or(Ok(Vec::new()));
        Box::pin(async move {
            tokio::task::yield_now().await;
            result.map_err(Error::Backend)
        })
    }

    fn add_note(&self, text: &str, owner_id: &str) -> BoxFuture<'_, Result<()>> {
        self.record_write(Write::Add {
            text: text.to_string(),
            owner_id: owner_id.to_string(),
        })
    }

    fn update_note(&self, note_id: &str, text: &str) -> BoxFuture<'_, Result<()>> {
        self.record_write(Write::Update {
            note_id: note_id.to_string(),
            text: text.to_string(),
        })
    }

    fn delete_note(&self, note_id: &str) -> BoxFuture<'_, Result<()>> {
        self.record_write(Write::Delete {
            note_id: note_id.to_string(),
        })
    }
}

/// Let spawned subscription tasks run until they are idle.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
