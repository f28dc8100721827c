// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the notes repository and the jotter REPL.
//!
//! Stored as TOML, every key optional:
//! - `collection`: document collection holding notes (default "notes")
//! - `order`: `newest_first` (default) or `oldest_first`
//! - `log_filter`: tracing filter used by the REPL when `RUST_LOG` is unset

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::store::Direction;

/// Order in which notes are listed, by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    /// Returns the query direction on the creation timestamp.
    pub fn direction(self) -> Direction {
        match self {
            SortOrder::NewestFirst => Direction::Descending,
            SortOrder::OldestFirst => Direction::Ascending,
        }
    }
}

/// jotter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document collection holding notes.
    pub collection: String,
    /// Listing order by creation time.
    pub order: SortOrder,
    /// Tracing filter directive for the REPL.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            collection: "notes".to_string(),
            order: SortOrder::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if config.collection.trim().is_empty() {
            return Err(Error::Config("collection must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Loads configuration from the given file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Config::from_toml(&content)
    }

    /// Saves configuration to the given file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
