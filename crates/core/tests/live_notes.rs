// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests: provider over the store-backed repository.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use jt_core::{Config, MemoryStore, NotesProvider, NotesState, StoreRepository};
use tokio::time::Instant;

type Provider = NotesProvider<StoreRepository<MemoryStore>>;

fn make_provider() -> (Provider, MemoryStore) {
    let store = MemoryStore::new();
    let repo = StoreRepository::new(store.clone(), Config::default());
    (NotesProvider::new(repo), store)
}

/// Wait until the provider's state satisfies `pred`.
async fn wait_for(provider: &Provider, pred: impl Fn(&NotesState) -> bool) -> NotesState {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let state = provider.state();
        if pred(&state) {
            return state;
        }
        assert!(Instant::now() < deadline, "timed out in state {:?}", state);
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

fn texts(state: &NotesState) -> Vec<&str> {
    state.notes.iter().map(|note| note.text.as_str()).collect()
}

#[tokio::test]
async fn writes_arrive_through_the_live_subscription() {
    let (provider, _store) = make_provider();

    provider.start_listening_to_notes("u1");
    wait_for(&provider, |s| !s.is_loading).await;

    assert!(provider.add_note("first", "u1").await);
    wait_for(&provider, |s| s.notes.len() == 1).await;

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(provider.add_note("second", "u1").await);
    let state = wait_for(&provider, |s| s.notes.len() == 2).await;
    assert_eq!(texts(&state), vec!["second", "first"]);

    let id = state.notes[1].id.clone();
    assert!(provider.update_note(&id, "first, edited", "u1").await);
    let state = wait_for(&provider, |s| texts(s).contains(&"first, edited")).await;
    assert_eq!(state.notes.len(), 2);

    assert!(provider.delete_note(&id, "u1").await);
    let state = wait_for(&provider, |s| s.notes.len() == 1).await;
    assert_eq!(texts(&state), vec!["second"]);
}

#[tokio::test]
async fn only_the_listened_owner_is_visible() {
    let (provider, _store) = make_provider();

    assert!(provider.add_note("belongs to u2", "u2").await);
    provider.start_listening_to_notes("u1");
    assert!(provider.add_note("belongs to u1", "u1").await);

    let state = wait_for(&provider, |s| s.notes.len() == 1).await;
    assert!(state.notes.iter().all(|note| note.owner_id == "u1"));
}

#[tokio::test]
async fn logout_then_login_shows_only_new_owner() {
    let (provider, _store) = make_provider();
    assert!(provider.add_note("u1 secret", "u1").await);
    assert!(provider.add_note("u2 note", "u2").await);

    provider.start_listening_to_notes("u1");
    wait_for(&provider, |s| s.notes.len() == 1).await;

    provider.clear_notes();
    assert_eq!(provider.state(), NotesState::default());

    provider.start_listening_to_notes("u2");
    let state = wait_for(&provider, |s| !s.is_loading).await;
    assert_eq!(texts(&state), vec!["u2 note"]);
}

#[tokio::test]
async fn backend_fault_is_sticky_until_dismissed() {
    let (provider, store) = make_provider();

    provider.start_listening_to_notes("u1");
    wait_for(&provider, |s| !s.is_loading).await;

    store.fail_with("network lost");
    wait_for(&provider, |s| s.error_message == "network lost").await;
    assert!(!provider.add_note("while offline", "u1").await);

    store.recover();
    assert!(provider.add_note("back online", "u1").await);
    let state = wait_for(&provider, |s| s.notes.len() == 1).await;
    assert_eq!(state.error_message, "");

    // A later fault followed by a successful snapshot keeps the error.
    store.fail_with("network lost");
    wait_for(&provider, |s| s.error_message == "network lost").await;
    store.recover();
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(provider.error_message(), "network lost");
    assert_eq!(provider.notes().len(), 1);

    provider.clear_error();
    assert_eq!(provider.error_message(), "");
}

#[tokio::test]
async fn subscribing_while_backend_is_down_reports_setup_failure() {
    let (provider, store) = make_provider();
    store.fail_with("permission denied");

    provider.start_listening_to_notes("u1");

    assert!(!provider.is_loading());
    assert_eq!(provider.error_message(), "permission denied");
    assert!(!provider.is_listening());
}

#[tokio::test]
async fn empty_owner_is_rejected() {
    let (provider, _store) = make_provider();

    provider.start_listening_to_notes("");

    assert!(!provider.is_loading());
    assert!(provider.error_message().contains("owner id"));
}

#[tokio::test]
async fn fetch_reads_current_notes_once() {
    let (provider, _store) = make_provider();
    assert!(provider.add_note("hello", "u1").await);

    provider.fetch_notes("u1").await;

    let state = provider.state();
    assert_eq!(texts(&state), vec!["hello"]);
    assert!(!state.is_loading);
    assert!(!provider.is_listening());
}
