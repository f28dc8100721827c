// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands accepted on stdin, one per line.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(no_binary_name = true)]
#[command(disable_version_flag = true)]
#[command(help_template = "Commands:\n{subcommands}")]
struct Line {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Add a note
    // parse_line replaces `text` with the rest of the line as typed.
    Add {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Replace a note's text
    Edit {
        id: String,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Delete a note
    #[command(visible_alias = "rm")]
    Delete { id: String },
    /// Fetch the current owner's notes once
    Fetch,
    /// Listen to an owner's live notes (default: the current owner)
    Listen { owner: Option<String> },
    /// Stop listening and clear the view
    Logout,
    /// Dismiss the current error
    Dismiss,
    /// Print the current view
    Show,
    /// Make the store fail every operation
    Offline {
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Bring the store back
    Online,
    /// End the session
    #[command(visible_alias = "exit")]
    Quit,
}

/// Parses one input line.
///
/// Blank lines yield `Ok(None)`. On failure, including `help`, the error
/// carries the text to show the user. Note text keeps its spacing.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    let command = Line::try_parse_from(words)
        .map(|parsed| parsed.command)
        .map_err(|e| e.to_string().trim_end().to_string())?;

    let command = match command {
        ReplCommand::Add { .. } => ReplCommand::Add {
            text: vec![rest_after(line, 1).to_string()],
        },
        ReplCommand::Edit { id, .. } => ReplCommand::Edit {
            id,
            text: vec![rest_after(line, 2).to_string()],
        },
        other => other,
    };
    Ok(Some(command))
}

/// Returns the line after its first `words` words, without the whitespace
/// around it.
fn rest_after(line: &str, words: usize) -> &str {
    let mut rest = line.trim();
    for _ in 0..words {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

/// Joins the words of a free-text argument back into one string.
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
#[path = "repl_tests.rs"]
mod tests;
