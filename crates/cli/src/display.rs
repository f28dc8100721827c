// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use jt_core::{Note, NotesState};

/// Maximum number of characters of note text shown per line.
const PREVIEW_WIDTH: usize = 60;

/// First line of the note text, cut to `width` characters.
///
/// An ellipsis marks text that was cut or that continues on later lines.
pub fn preview(text: &str, width: usize) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("");
    let more_lines = lines.next().is_some();

    let mut out: String = first.chars().take(width).collect();
    if more_lines || first.chars().count() > width {
        out.push('…');
    }
    out
}

/// One listing line: id, last update time, text preview.
pub fn format_note_line(note: &Note) -> String {
    format!(
        "{}  {}  {}",
        note.id,
        note.updated_at.format("%Y-%m-%d %H:%M"),
        preview(&note.text, PREVIEW_WIDTH)
    )
}

/// Renders the whole view: loading marker, error banner, then the notes.
pub fn render_state(state: &NotesState) -> String {
    let mut lines = Vec::new();
    if state.is_loading {
        lines.push("… loading".to_string());
    }
    if !state.error_message.is_empty() {
        lines.push(format!("! {}", state.error_message));
    }
    if state.notes.is_empty() {
        if !state.is_loading {
            lines.push("(no notes)".to_string());
        }
    } else {
        lines.extend(state.notes.iter().map(format_note_line));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
