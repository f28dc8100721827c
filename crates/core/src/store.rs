// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Document store abstraction.
//!
//! The notes repository never reaches for a global backend connection; it is
//! handed a [`DocumentStore`] at construction. This keeps the hosted backend
//! substitutable:
//! - A hosted document database client in production
//! - [`MemoryStore`](crate::memory::MemoryStore) for tests and local runs

use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;
use serde_json::Value;

use crate::error::Result;

/// Generic key/value mapping stored per document.
pub type Fields = serde_json::Map<String, Value>;

/// Boxed future returned by store and repository operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Live sequence of complete result sets for a watched query.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Vec<Document>>> + Send>>;

/// A stored document: backend-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Document {
            id: id.into(),
            fields,
        }
    }
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A single-collection query: one optional equality filter and one optional
/// ordering field.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Option<(String, Value)>,
    pub order: Option<(String, Direction)>,
}

impl Query {
    /// Starts a query over every document in `collection`.
    pub fn collection(name: impl Into<String>) -> Self {
        Query {
            collection: name.into(),
            filter: None,
            order: None,
        }
    }

    /// Keeps only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    /// Orders results by `field`.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    /// Returns true if `fields` passes this query's filter.
    pub fn matches(&self, fields: &Fields) -> bool {
        match &self.filter {
            Some((field, expected)) => fields.get(field) == Some(expected),
            None => true,
        }
    }

    /// Compares two documents by this query's ordering field.
    ///
    /// Documents without an ordering field sort as equal, so a stable sort
    /// keeps their existing relative order.
    pub fn compare(&self, a: &Fields, b: &Fields) -> Ordering {
        let Some((field, direction)) = &self.order else {
            return Ordering::Equal;
        };
        let ordering = match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => compare_values(x, y),
            _ => Ordering::Equal,
        };
        match direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Client for a remote document database.
///
/// Every operation may fail. [`DocumentStore::watch`] may also fail
/// synchronously while setting up the live query.
pub trait DocumentStore: Send + Sync + 'static {
    /// Opens a live query. The first item is the current result set; every
    /// later item is a complete replacement result set.
    fn watch(&self, query: &Query) -> Result<DocumentStream>;

    /// Runs a query once.
    fn get(&self, query: &Query) -> BoxFuture<'_, Result<Vec<Document>>>;

    /// Inserts a new document and returns its backend-assigned id.
    fn insert(&self, collection: &str, fields: Fields) -> BoxFuture<'_, Result<String>>;

    /// Merges `fields` into an existing document.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the document
    /// does not exist.
    fn update(&self, collection: &str, id: &str, fields: Fields) -> BoxFuture<'_, Result<()>>;

    /// Deletes a document. Deleting a missing document succeeds.
    fn delete(&self, collection: &str, id: &str) -> BoxFuture<'_, Result<()>>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
