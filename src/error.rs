use thiserror::Error;

use crate::executor::ExecutorState;

/// Failures raised by the storage layer. Driver errors are flattened to
/// their message so nothing above the session branches on driver types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("no open connection")]
    NotConnected,

    #[error("could not connect to '{location}': {message}")]
    Connect { location: String, message: String },

    #[error("could not create schema: {0}")]
    Schema(String),

    #[error("could not prepare {statement} statement: {message}")]
    Prepare {
        statement: &'static str,
        message: String,
    },

    #[error("{statement} statement failed: {message}")]
    Execute {
        statement: &'static str,
        message: String,
    },

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("rollback failed: {0}")]
    Rollback(String),

    #[error("could not close connection: {0}")]
    Close(String),

    #[error("executor is not idle ({0:?})")]
    Busy(ExecutorState),
}

/// Malformed arguments caught before anything reaches storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid number format for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("product name must not be empty")]
    EmptyName,

    #[error("invalid choice '{0}', please enter a number between 1 and 5")]
    UnknownSelection(String),
}
