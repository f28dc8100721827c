// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The note entity and its document mapping.
//!
//! Serde is the document mapping: a serialized [`Note`] is exactly the field
//! map stored in the backend, and deserializing a field map yields a note
//! without an id (the id is the document key).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::store::{Document, Fields};

/// Document field holding the note content.
pub const FIELD_TEXT: &str = "text";
/// Document field holding the owner id. The only partition key for queries.
pub const FIELD_OWNER: &str = "userId";
/// Document field holding the creation timestamp.
pub const FIELD_CREATED_AT: &str = "createdAt";
/// Document field holding the last update timestamp.
pub const FIELD_UPDATED_AT: &str = "updatedAt";

/// A personal text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "NoteFields", from = "NoteFields")]
pub struct Note {
    /// Backend-assigned identifier. Empty until persisted.
    pub id: String,
    /// The note content.
    pub text: String,
    /// The user who owns the note.
    pub owner_id: String,
    /// When the note was created.
    pub created_at: DateTime<Utc>,
    /// When the note was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Stored shape of a note.
///
/// Every field may be absent: missing text or owner decode as empty, a
/// missing `createdAt` is a pending server timestamp and decodes as now,
/// and a missing `updatedAt` falls back to `createdAt`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteFields {
    #[serde(default, deserialize_with = "decode::text")]
    text: Option<String>,
    #[serde(rename = "userId", default, deserialize_with = "decode::owner")]
    owner_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "encode_timestamp",
        deserialize_with = "decode::created_at"
    )]
    created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "encode_timestamp",
        deserialize_with = "decode::updated_at"
    )]
    updated_at: Option<DateTime<Utc>>,
}

impl From<Note> for NoteFields {
    fn from(note: Note) -> Self {
        NoteFields {
            text: Some(note.text),
            owner_id: Some(note.owner_id),
            created_at: Some(note.created_at),
            updated_at: Some(note.updated_at),
        }
    }
}

impl From<NoteFields> for Note {
    fn from(fields: NoteFields) -> Self {
        let created_at = fields.created_at.unwrap_or_else(Utc::now);
        Note {
            id: String::new(),
            text: fields.text.unwrap_or_default(),
            owner_id: fields.owner_id.unwrap_or_default(),
            created_at,
            updated_at: fields.updated_at.unwrap_or(created_at),
        }
    }
}

impl Note {
    /// Creates an unpersisted note stamped with `now`.
    pub fn new(text: impl Into<String>, owner_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Note {
            id: String::new(),
            text: text.into(),
            owner_id: owner_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the same note carrying a backend id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns true once the backend has assigned an id.
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Converts the note into document fields. The id is the document key
    /// and is not included.
    pub fn to_map(&self) -> Fields {
        match serde_json::to_value(NoteFields::from(self.clone())) {
            Ok(Value::Object(map)) => map,
            // Strings and timestamps always encode to an object.
            _ => Fields::new(),
        }
    }

    /// Rebuilds a note from its document id and fields.
    ///
    /// Fields of the wrong type are [`Error::CorruptedData`].
    pub fn from_map(id: &str, map: &Fields) -> Result<Note> {
        serde_json::from_value::<Note>(Value::Object(map.clone()))
            .map(|note| note.with_id(id))
            .map_err(|e| Error::CorruptedData {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    /// Decodes a stored document.
    pub fn from_document(doc: &Document) -> Result<Note> {
        Note::from_map(&doc.id, &doc.fields)
    }
}

/// Encodes a timestamp as a fixed-width RFC 3339 string, so lexicographic
/// order matches time order.
pub fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(timestamp_string(ts))
}

fn timestamp_string(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_str(&timestamp_string(*ts)),
        None => serializer.serialize_none(),
    }
}

/// Lenient field decoders. Errors name the offending document field.
mod decode {
    use serde::de::Error as _;

    use super::*;

    type Decoded<'de, D, T> = std::result::Result<Option<T>, <D as Deserializer<'de>>::Error>;

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Decoded<'de, D, String> {
        string(d, FIELD_TEXT)
    }

    pub(super) fn owner<'de, D: Deserializer<'de>>(d: D) -> Decoded<'de, D, String> {
        string(d, FIELD_OWNER)
    }

    pub(super) fn created_at<'de, D: Deserializer<'de>>(d: D) -> Decoded<'de, D, DateTime<Utc>> {
        timestamp(d, FIELD_CREATED_AT)
    }

    pub(super) fn updated_at<'de, D: Deserializer<'de>>(d: D) -> Decoded<'de, D, DateTime<Utc>> {
        timestamp(d, FIELD_UPDATED_AT)
    }

    fn string<'de, D: Deserializer<'de>>(d: D, field: &str) -> Decoded<'de, D, String> {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(D::Error::custom(mismatch(field, "a string", &other))),
        }
    }

    /// Accepts RFC 3339 strings and integer epoch milliseconds.
    fn timestamp<'de, D: Deserializer<'de>>(d: D, field: &str) -> Decoded<'de, D, DateTime<Utc>> {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(|e| {
                    D::Error::custom(format!("{} '{}' is not RFC 3339: {}", field, s, e))
                }),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(Some)
                .ok_or_else(|| {
                    D::Error::custom(mismatch(field, "epoch milliseconds", &Value::Number(n)))
                }),
            Some(other) => Err(D::Error::custom(mismatch(field, "a timestamp", &other))),
        }
    }

    fn mismatch(field: &str, expected: &str, found: &Value) -> String {
        format!("{} should be {}, found {}", field, expected, found)
    }
}

#[cfg(test)]
#[path = "note_tests.rs"]
mod tests;
