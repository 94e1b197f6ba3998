//! Classifies failures and surfaces them to the operator.

use std::fmt;

use log::Level;

use crate::error::{InputError, StorageError};
use crate::executor::{OperationKind, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Malformed caller input; nothing reached storage.
    Input,
    /// A mutation matched no rows and was rolled back.
    NoEffect,
    /// Prepare, execute or commit failed and was rolled back.
    Storage,
    /// Rollback failed; the session can no longer be trusted.
    Critical,
    /// The initial connection failed; nothing will run.
    Connection,
}

impl FailureClass {
    pub fn tag(self) -> &'static str {
        match self {
            FailureClass::Input => "ERROR",
            FailureClass::NoEffect => "WARNING",
            FailureClass::Storage => "ERROR",
            FailureClass::Critical => "CRITICAL",
            FailureClass::Connection => "FATAL ERROR",
        }
    }

    pub fn level(self) -> Level {
        match self {
            FailureClass::Input | FailureClass::NoEffect => Level::Warn,
            FailureClass::Storage | FailureClass::Critical | FailureClass::Connection => {
                Level::Error
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub class: FailureClass,
    pub operation: Option<OperationKind>,
    pub message: String,
}

impl Report {
    /// `None` when the outcome was a commit.
    pub fn from_outcome(outcome: &Outcome) -> Option<Self> {
        outcome.class().map(|class| Self {
            class,
            operation: Some(outcome.operation()),
            message: outcome.message(),
        })
    }

    pub fn input(error: &InputError) -> Self {
        Self {
            class: FailureClass::Input,
            operation: None,
            message: error.to_string(),
        }
    }

    pub fn read_failed(error: &StorageError) -> Self {
        Self {
            class: FailureClass::Storage,
            operation: Some(OperationKind::ReadAll),
            message: format!("Failed to read products: {error}"),
        }
    }

    pub fn connection(error: &StorageError) -> Self {
        Self {
            class: FailureClass::Connection,
            operation: None,
            message: format!("Could not connect to the database: {error}"),
        }
    }

    pub fn close_failed(error: &StorageError) -> Self {
        Self {
            class: FailureClass::Storage,
            operation: None,
            message: format!("Failed to close connection: {error}"),
        }
    }

    /// Send the report through the `log` facade at its class's level.
    pub fn emit(&self) {
        log::log!(self.class.level(), "{}", self.log_line());
    }

    fn log_line(&self) -> String {
        match self.operation {
            Some(operation) => format!("[{}] [{operation}] {}", self.class.tag(), self.message),
            None => format!("[{}] {}", self.class.tag(), self.message),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.class.tag(), self.message)
    }
}
