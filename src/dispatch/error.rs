//! Error types for operator actions.

use crate::api::ApiError;
use thiserror::Error;

/// Why an operator action did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Input rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    /// Action not allowed in the server's current state (e.g. active workers).
    /// No remote call was made.
    #[error("{0}")]
    Precondition(String),

    /// The same action is already outstanding for this target.
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// The backend refused the action; the text is the backend's own.
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or answered garbage.
    #[error("{0}")]
    Transport(String),
}

impl ActionError {
    /// Text shown to the operator at the point of the action.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether a remote call was attempted.
    pub fn reached_remote(&self) -> bool {
        matches!(self, ActionError::Rejected(_) | ActionError::Transport(_))
    }

    pub(crate) fn outcome_label(&self) -> &'static str {
        match self {
            ActionError::Validation(_) => "invalid",
            ActionError::Precondition(_) => "blocked",
            ActionError::Busy(_) => "busy",
            ActionError::Rejected(_) => "rejected",
            ActionError::Transport(_) => "failed",
        }
    }
}

impl From<ApiError> for ActionError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Rejected { detail, .. } => ActionError::Rejected(detail),
            other => ActionError::Transport(other.to_string()),
        }
    }
}
