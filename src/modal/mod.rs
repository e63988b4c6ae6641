//! Dialogs layered over the dispatcher: add-server form and worker
//! join-command viewer.

mod add_server;
mod clipboard;
mod join_command;

pub use add_server::AddServerForm;
pub use clipboard::{
    osc52_sequence, Clipboard, ClipboardError, MemoryClipboard, StdoutClipboard, TerminalClipboard,
};
pub use join_command::{
    CopyError, JoinCommandModal, JoinPhase, COPIED_ACK, COPIED_LABEL, COPY_LABEL,
};
