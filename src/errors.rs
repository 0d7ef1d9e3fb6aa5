//! Structured error types for dialogd
//!
//! Uses thiserror for ergonomic error definitions with automatic Display
//! and Error trait implementations.

use thiserror::Error;

/// Errors surfaced by the dialog coordinator
///
/// None of these are retried internally; they go straight back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// No current dialog, or the current dialog is not in the required state
    #[error("No dialog: {0}")]
    NoDialog(&'static str),

    /// Operation is not valid for the current dialog's kind or state
    #[error("Invalid dialog state: {0}")]
    InvalidDialogState(&'static str),

    /// The UI surface failed to deliver a response
    #[error("Dialog interaction failed: {0}")]
    DialogInteraction(String),

    /// A blocking wait was cancelled before it completed
    #[error("Wait interrupted")]
    InterruptedWait,
}

/// Convenience Result type using DialogError
pub type Result<T> = std::result::Result<T, DialogError>;

/// Errors produced while binding and dispatching a remote call
#[derive(Error, Debug)]
pub enum RpcError {
    /// Method name not in the method table
    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    /// Required parameter was not supplied
    #[error("{method}: missing required parameter '{param}'")]
    MissingParam {
        method: &'static str,
        param: &'static str,
    },

    /// Parameter present but of the wrong shape
    #[error("{method}: invalid parameter '{param}': {reason}")]
    InvalidParam {
        method: &'static str,
        param: &'static str,
        reason: String,
    },

    /// Named parameter the method does not declare
    #[error("{method}: unknown parameter '{param}'")]
    UnknownParam {
        method: &'static str,
        param: String,
    },

    /// More positional parameters than the method declares
    #[error("{method}: expected at most {expected} parameters, got {got}")]
    TooManyParams {
        method: &'static str,
        expected: usize,
        got: usize,
    },

    /// Connection refused because every session slot is taken
    #[error("Host busy: {0} session(s) already connected")]
    SessionLimit(usize),

    /// Request line was not a valid envelope
    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    /// Coordinator rejected the call
    #[error(transparent)]
    Dialog(#[from] DialogError),
}
