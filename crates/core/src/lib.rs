// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! jt-core: Shared library for the jotter notes app
//!
//! This crate provides the note entity, the repository boundary over a
//! document store, and [`NotesProvider`], the state holder that mirrors one
//! owner's live notes into observable state.
//!
//! # Data flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Observers  │◄────│  NotesProvider  │◄────│ NotesRepository │
//! │    (UI)     │────►│  (state holder) │────►│     (trait)     │
//! └─────────────┘     └─────────────────┘     └─────────────────┘
//!                                                      │
//!                                                      ▼
//!                                             ┌─────────────────┐
//!                                             │  DocumentStore  │
//!                                             │     (trait)     │
//!                                             └─────────────────┘
//! ```
//!
//! Writes go down through the repository; their effect comes back up through
//! the live subscription, never through the write's return value.

pub mod config;
pub mod error;
pub mod memory;
pub mod note;
pub mod observer;
pub mod provider;
pub mod repository;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use config::{Config, SortOrder};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use note::Note;
pub use observer::ObserverId;
pub use provider::{NotesProvider, NotesState, Subscription};
pub use repository::{NoteStream, NotesRepository, StoreRepository};
pub use store::{BoxFuture, Direction, Document, DocumentStore, DocumentStream, Fields, Query};
