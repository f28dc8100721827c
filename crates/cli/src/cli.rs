// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process arguments.

use clap::Parser;
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
pub(crate) fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive notes session against an in-memory document store")]
#[command(
    long_about = "Interactive notes session against an in-memory document store.\n\n\
    Reads commands from stdin and prints the notes view after every change. \
    Type `help` for the list of commands."
)]
pub struct Cli {
    /// Configuration file (default: <config dir>/jotter/config.toml if present)
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Owner to listen to at startup
    #[arg(short, long, default_value = "local", value_parser = non_empty_string)]
    pub owner: String,

    /// Enable debug logging (overrides the configured filter, not RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}
