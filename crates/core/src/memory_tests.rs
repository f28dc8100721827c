// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::store::Direction;
use futures_util::StreamExt;
use serde_json::{json, Value};

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|doc| doc.id.as_str()).collect()
}

#[tokio::test]
async fn insert_assigns_distinct_ids() {
    let store = MemoryStore::new();
    let a = store.insert("notes", fields(json!({"text": "a"}))).await.unwrap();
    let b = store.insert("notes", fields(json!({"text": "b"}))).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(store.len("notes"), 2);
    assert!(store.is_empty("other"));
}

#[tokio::test]
async fn get_filters_and_orders() {
    let store = MemoryStore::new();
    store
        .insert("notes", fields(json!({"userId": "u1", "createdAt": "2026-01-01"})))
        .await
        .unwrap();
    store
        .insert("notes", fields(json!({"userId": "u2", "createdAt": "2026-01-02"})))
        .await
        .unwrap();
    let newest = store
        .insert("notes", fields(json!({"userId": "u1", "createdAt": "2026-01-03"})))
        .await
        .unwrap();

    let query = Query::collection("notes")
        .where_eq("userId", "u1")
        .order_by("createdAt", Direction::Descending);
    let docs = store.get(&query).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, newest);
    assert!(docs.iter().all(|doc| doc.fields["userId"] == json!("u1")));
}

#[tokio::test]
async fn unordered_query_keeps_insertion_order() {
    let store = MemoryStore::new();
    let first = store.insert("notes", Fields::new()).await.unwrap();
    let second = store.insert("notes", Fields::new()).await.unwrap();

    let docs = store.get(&Query::collection("notes")).await.unwrap();
    assert_eq!(ids(&docs), vec![first.as_str(), second.as_str()]);
}

#[tokio::test]
async fn update_merges_fields() {
    let store = MemoryStore::new();
    let id = store
        .insert("notes", fields(json!({"text": "old", "userId": "u1"})))
        .await
        .unwrap();

    store
        .update("notes", &id, fields(json!({"text": "new"})))
        .await
        .unwrap();

    let docs = store.get(&Query::collection("notes")).await.unwrap();
    assert_eq!(docs[0].fields["text"], json!("new"));
    assert_eq!(docs[0].fields["userId"], json!("u1"));
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .update("notes", "nope", Fields::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let store = MemoryStore::new();
    let id = store.insert("notes", Fields::new()).await.unwrap();

    store.delete("notes", &id).await.unwrap();
    store.delete("notes", &id).await.unwrap();
    store.delete("missing", "x").await.unwrap();

    assert!(store.is_empty("notes"));
}

#[tokio::test]
async fn watch_emits_current_then_each_change() {
    let store = MemoryStore::new();
    store.insert("notes", fields(json!({"userId": "u1"}))).await.unwrap();

    let query = Query::collection("notes").where_eq("userId", "u1");
    let mut stream = store.watch(&query).unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.len(), 1);

    let id = store.insert("notes", fields(json!({"userId": "u1"}))).await.unwrap();
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.len(), 2);

    store.delete("notes", &id).await.unwrap();
    let third = stream.next().await.unwrap().unwrap();
    assert_eq!(third.len(), 1);
}

#[tokio::test]
async fn watch_ignores_other_collections() {
    let store = MemoryStore::new();
    let mut stream = store.watch(&Query::collection("notes")).unwrap();
    assert!(stream.next().await.unwrap().unwrap().is_empty());

    store.insert("drafts", Fields::new()).await.unwrap();
    store.insert("notes", Fields::new()).await.unwrap();

    // The drafts write is skipped; the next item reflects the notes write.
    let next = stream.next().await.unwrap().unwrap();
    assert_eq!(next.len(), 1);
}

#[tokio::test]
async fn fault_fails_operations() {
    let store = MemoryStore::new();
    store.fail_with("network lost");

    let query = Query::collection("notes");
    assert_eq!(
        store.get(&query).await.unwrap_err().to_string(),
        "network lost"
    );
    assert!(store.insert("notes", Fields::new()).await.is_err());
    assert!(store.delete("notes", "x").await.is_err());
    assert!(store.watch(&query).is_err());

    store.recover();
    assert!(store.get(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn fault_reaches_open_watch_without_closing_it() {
    let store = MemoryStore::new();
    let mut stream = store.watch(&Query::collection("notes")).unwrap();
    stream.next().await.unwrap().unwrap();

    store.fail_with("network lost");
    let err = stream.next().await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "network lost");

    store.recover();
    assert!(stream.next().await.unwrap().unwrap().is_empty());

    store.insert("notes", Fields::new()).await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap().len(), 1);
}
