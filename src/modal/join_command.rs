//! Worker join-command dialog.

use super::clipboard::{Clipboard, ClipboardError};
use crate::api::{JoinCommand, JoinCommandRequest, ServerId};
use crate::dispatch::ActionDispatcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// How long the "copied" acknowledgment stays up.
pub const COPIED_ACK: Duration = Duration::from_secs(2);

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    #[error("No command loaded")]
    NothingToCopy,
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Lifecycle of the dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JoinPhase {
    #[default]
    Closed,
    Loading,
    Ready(JoinCommand),
    /// Fetch failed; the dialog shows the message and offers a retry.
    Failed(String),
}

/// Shows the command that attaches a new worker machine to the fleet.
#[derive(Debug, Default)]
pub struct JoinCommandModal {
    phase: JoinPhase,
    request: JoinCommandRequest,
    copied: Arc<AtomicBool>,
    reset: Option<JoinHandle<()>>,
}

impl JoinCommandModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &JoinPhase {
        &self.phase
    }

    pub fn server_id(&self) -> Option<&ServerId> {
        self.request.server_id.as_ref()
    }

    /// Open the dialog and fetch the command, optionally scoped to a server.
    pub async fn open(
        &mut self,
        dispatcher: &ActionDispatcher,
        server_id: Option<ServerId>,
    ) -> &JoinPhase {
        self.open_with(dispatcher, JoinCommandRequest::for_server(server_id))
            .await
    }

    /// Open with every query option (server scope and worker name).
    pub async fn open_with(
        &mut self,
        dispatcher: &ActionDispatcher,
        request: JoinCommandRequest,
    ) -> &JoinPhase {
        self.request = request;
        self.load(dispatcher).await
    }

    /// Fetch again with the same scope.
    pub async fn retry(&mut self, dispatcher: &ActionDispatcher) -> &JoinPhase {
        self.load(dispatcher).await
    }

    async fn load(&mut self, dispatcher: &ActionDispatcher) -> &JoinPhase {
        self.clear_ack();
        self.phase = JoinPhase::Loading;
        self.phase = match dispatcher.fetch_join_command_with(&self.request).await {
            Ok(command) => JoinPhase::Ready(command),
            Err(e) => JoinPhase::Failed(e.user_message()),
        };
        &self.phase
    }

    pub fn close(&mut self) {
        self.clear_ack();
        self.phase = JoinPhase::Closed;
        self.request = JoinCommandRequest::default();
    }

    /// Copy the loaded command and show the acknowledgment for
    /// [`COPIED_ACK`]. Copying again restarts the window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn copy(&mut self, clipboard: &dyn Clipboard) -> Result<(), CopyError> {
        let JoinPhase::Ready(command) = &self.phase else {
            return Err(CopyError::NothingToCopy);
        };
        clipboard.write_text(&command.command)?;

        self.clear_ack();
        self.copied.store(true, Ordering::SeqCst);
        let copied = Arc::clone(&self.copied);
        let deadline = tokio::time::Instant::now() + COPIED_ACK;
        self.reset = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            copied.store(false, Ordering::SeqCst);
        }));
        Ok(())
    }

    pub fn is_copied(&self) -> bool {
        self.copied.load(Ordering::SeqCst)
    }

    pub fn copy_label(&self) -> &'static str {
        if self.is_copied() {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    fn clear_ack(&mut self) {
        if let Some(reset) = self.reset.take() {
            reset.abort();
        }
        self.copied.store(false, Ordering::SeqCst);
    }
}

impl Drop for JoinCommandModal {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            reset.abort();
        }
    }
}
