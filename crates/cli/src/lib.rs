// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! jotter - interactive notes session.
//!
//! Wires a [`NotesProvider`] to a [`StoreRepository`] over an in-process
//! [`MemoryStore`] and drives it from stdin. Every state change is printed
//! as it happens, so the live subscription can be watched reacting to writes
//! and to store faults.

pub mod cli;
pub mod display;
pub mod repl;

use std::path::{Path, PathBuf};

use jt_core::{Config, MemoryStore, NotesProvider, Result, StoreRepository};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

pub use cli::Cli;
pub use repl::{parse_line, ReplCommand};

/// Fault message used by `offline` when none is given.
const DEFAULT_FAULT: &str = "store offline";

/// Returns `<config dir>/jotter/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jotter").join("config.toml"))
}

/// Loads configuration from `explicit`, else from the default path if that
/// file exists, else falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => Config::load(&path),
        _ => Ok(Config::default()),
    }
}

/// What the input loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading; print the reply if there is one.
    Continue(Option<String>),
    Quit,
}

/// One user's session: the provider, its store, and the current owner.
pub struct Session {
    provider: NotesProvider<StoreRepository<MemoryStore>>,
    store: MemoryStore,
    owner: String,
}

impl Session {
    /// Creates a session over a fresh, empty store.
    pub fn new(config: Config, owner: impl Into<String>) -> Self {
        let store = MemoryStore::new();
        let repository = StoreRepository::new(store.clone(), config);
        Session {
            provider: NotesProvider::new(repository),
            store,
            owner: owner.into(),
        }
    }

    pub fn provider(&self) -> &NotesProvider<StoreRepository<MemoryStore>> {
        &self.provider
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Owner that writes and fetches act on.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Starts listening to the current owner.
    pub fn listen(&self) {
        info!("listening to notes for {}", self.owner);
        self.provider.start_listening_to_notes(&self.owner);
    }

    pub async fn execute(&mut self, command: ReplCommand) -> Outcome {
        let reply = match command {
            ReplCommand::Add { text } => {
                let accepted = self
                    .provider
                    .add_note(&repl::join_words(&text), &self.owner)
                    .await;
                write_reply(accepted)
            }
            ReplCommand::Edit { id, text } => {
                let accepted = self
                    .provider
                    .update_note(&id, &repl::join_words(&text), &self.owner)
                    .await;
                write_reply(accepted)
            }
            ReplCommand::Delete { id } => {
                let accepted = self.provider.delete_note(&id, &self.owner).await;
                write_reply(accepted)
            }
            ReplCommand::Fetch => {
                self.provider.fetch_notes(&self.owner).await;
                None
            }
            ReplCommand::Listen { owner } => {
                if let Some(owner) = owner {
                    self.owner = owner;
                }
                self.listen();
                Some(format!("listening to {}", self.owner))
            }
            ReplCommand::Logout => {
                self.provider.clear_notes();
                Some("logged out".to_string())
            }
            ReplCommand::Dismiss => {
                self.provider.clear_error();
                None
            }
            ReplCommand::Show => Some(display::render_state(&self.provider.state())),
            ReplCommand::Offline { message } => {
                let message = if message.is_empty() {
                    DEFAULT_FAULT.to_string()
                } else {
                    repl::join_words(&message)
                };
                self.store.fail_with(message);
                Some("store offline".to_string())
            }
            ReplCommand::Online => {
                self.store.recover();
                Some("store online".to_string())
            }
            ReplCommand::Quit => return Outcome::Quit,
        };
        Outcome::Continue(reply)
    }
}

fn write_reply(accepted: bool) -> Option<String> {
    Some(if accepted { "ok" } else { "failed" }.to_string())
}

/// Runs the session, reading commands from stdin until `quit` or EOF.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut session = Session::new(config, cli.owner);
    session
        .provider()
        .observe(|state| println!("{}\n", display::render_state(state)));
    session.listen();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(command)) => match session.execute(command).await {
                Outcome::Continue(Some(reply)) => println!("{}", reply),
                Outcome::Continue(None) => {}
                Outcome::Quit => break,
            },
            Err(message) => println!("{}", message),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
