//! Clipboard seam for the join-command dialog.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::io::Write;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Destination for copied text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps the last copied text in memory (headless sessions, tests).
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

/// Writes the text to stdout so it can be piped (`fleet workers command | pbcopy`).
#[derive(Debug, Default)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", text)
            .and_then(|_| out.flush())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}

/// OSC 52 escape sequence that asks the terminal to set its clipboard.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1B]52;c;{}\x07", BASE64.encode(text))
}

/// Sets the clipboard of the terminal the console runs in (works over SSH
/// on terminals that honour OSC 52).
#[derive(Debug, Default)]
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut out = std::io::stdout().lock();
        write!(out, "{}", osc52_sequence(text))
            .and_then(|_| out.flush())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}
