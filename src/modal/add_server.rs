//! Add-server form.

use crate::api::Server;
use crate::dispatch::{validate_new_server, ActionDispatcher};

/// Fields and submission state of the add-server dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddServerForm {
    pub open: bool,
    pub name: String,
    pub url: String,
    pub priority: i64,
    pub submitting: bool,
    /// Inline message (validation or backend rejection)
    pub error: Option<String>,
}

impl Default for AddServerForm {
    fn default() -> Self {
        Self {
            open: false,
            name: String::new(),
            url: String::new(),
            priority: 0,
            submitting: false,
            error: None,
        }
    }
}

impl AddServerForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty form.
    pub fn open(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Validate locally, then submit through the dispatcher.
    ///
    /// Validation failures never reach the dispatcher. A rejected submission
    /// keeps every field for correction and leaves the form open. Success
    /// closes and resets the form; the dispatcher has already refreshed
    /// the registry.
    pub async fn submit(&mut self, dispatcher: &ActionDispatcher) -> Option<Server> {
        if self.submitting {
            return None;
        }
        if let Err(e) = validate_new_server(&self.name, &self.url, self.priority) {
            self.error = Some(e.user_message());
            return None;
        }

        self.submitting = true;
        self.error = None;
        let result = dispatcher
            .add_server(&self.name, &self.url, self.priority)
            .await;
        self.submitting = false;

        match result {
            Ok(server) => {
                self.close();
                Some(server)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                None
            }
        }
    }
}
