//! Last-resort recovery boundary around rendering.
//!
//! A render that fails, or panics, is replaced by a recovery screen offering
//! "retry" (clear the fault and render again) and "reload" (clear the fault
//! and re-fetch everything). The surrounding session keeps running.

use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// A render step that could not produce output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

/// Whether the guarded subtree is showing content or the recovery screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BoundaryState {
    #[default]
    Healthy,
    Faulted(String),
}

/// Operator choices on the recovery screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Retry,
    Reload,
}

#[derive(Debug, Default)]
pub struct RecoveryBoundary {
    state: BoundaryState,
    reload_requested: bool,
}

impl RecoveryBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self.state, BoundaryState::Faulted(_))
    }

    /// Run `render` unless the boundary is faulted.
    ///
    /// Errors and panics fault the boundary; until the operator recovers,
    /// every call returns the recovery screen without running `render`.
    pub fn render<F>(&mut self, render: F) -> String
    where
        F: FnOnce() -> Result<String, RenderError>,
    {
        if let BoundaryState::Faulted(message) = &self.state {
            return recovery_screen(message);
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(render));
        let message = match outcome {
            Ok(Ok(output)) => return output,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        tracing::error!(error = %message, "Render failed, showing recovery screen");
        let screen = recovery_screen(&message);
        self.state = BoundaryState::Faulted(message);
        screen
    }

    /// Apply the operator's choice.
    pub fn recover(&mut self, choice: Recovery) {
        self.state = BoundaryState::Healthy;
        if choice == Recovery::Reload {
            self.reload_requested = true;
        }
    }

    /// Whether a reload was requested since the last call.
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected error".to_string()
    }
}

fn recovery_screen(message: &str) -> String {
    format!(
        "Something went wrong while drawing this view.\n\n  {}\n\n[r] retry   [R] reload   [q] quit",
        message
    )
}
