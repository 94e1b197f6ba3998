//! The per-operation transaction state machine.
//!
//! ```text
//! Idle -> Preparing -> Executing -> Committing  -> Idle
//!                               \-> RollingBack -> Idle
//! ```
//!
//! A mutation commits only when it changed at least one row. Zero rows, or
//! any prepare/execute/commit failure, ends in a rollback. A failed
//! rollback is reported as critical, but the executor still returns to
//! `Idle` and the session can still be closed.

use std::fmt;

use log::{debug, error, info, trace, warn};

use crate::error::StorageError;
use crate::record::{NewRecord, Record, RecordId};
use crate::report::FailureClass;
use crate::session::{Execution, Prepared, Session};
use crate::statement::BoundStatement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Preparing,
    Executing,
    Committing,
    RollingBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    ReadAll,
    Update,
    Delete,
}

impl OperationKind {
    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Create => "Create Product",
            OperationKind::ReadAll => "Read All Products",
            OperationKind::Update => "Update Product",
            OperationKind::Delete => "Delete Product",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            OperationKind::Create => "created",
            OperationKind::ReadAll => "read",
            OperationKind::Update => "updated",
            OperationKind::Delete => "deleted",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a mutating operation resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows changed and the transaction committed.
    Committed {
        operation: OperationKind,
        id: RecordId,
        rows: usize,
    },
    /// Nothing matched; the transaction was rolled back.
    NoEffect {
        operation: OperationKind,
        id: Option<RecordId>,
    },
    /// Storage failed and the rollback succeeded.
    Failed {
        operation: OperationKind,
        error: StorageError,
    },
    /// The rollback itself failed. `error` is what triggered it, if anything
    /// did beyond a no-effect result.
    Critical {
        operation: OperationKind,
        error: Option<StorageError>,
        rollback: StorageError,
    },
}

impl Outcome {
    pub fn operation(&self) -> OperationKind {
        match self {
            Outcome::Committed { operation, .. }
            | Outcome::NoEffect { operation, .. }
            | Outcome::Failed { operation, .. }
            | Outcome::Critical { operation, .. } => *operation,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    /// Failure class, or `None` for a committed operation.
    pub fn class(&self) -> Option<FailureClass> {
        match self {
            Outcome::Committed { .. } => None,
            Outcome::NoEffect { .. } => Some(FailureClass::NoEffect),
            Outcome::Failed { .. } => Some(FailureClass::Storage),
            Outcome::Critical { .. } => Some(FailureClass::Critical),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Committed { operation, id, .. } => format!(
                "Product ID {id} {} and transaction committed.",
                operation.past_tense()
            ),
            Outcome::NoEffect { id: Some(id), .. } => {
                format!("No product found with ID {id}. Transaction rolled back.")
            }
            Outcome::NoEffect { operation, id: None } => {
                format!("{operation} had no effect. Transaction rolled back.")
            }
            Outcome::Failed { operation, error } => {
                format!("{operation} failed: {error}. Transaction rolled back.")
            }
            Outcome::Critical {
                operation,
                error: Some(error),
                rollback,
            } => format!("{operation} failed: {error}. Could not execute rollback: {rollback}"),
            Outcome::Critical {
                operation,
                error: None,
                rollback,
            } => format!("{operation} had no effect. Could not execute rollback: {rollback}"),
        }
    }

    /// The `(success, message)` pair handed to the console.
    pub fn summary(&self) -> (bool, String) {
        (self.is_success(), self.message())
    }
}

fn enter(state: &mut ExecutorState, next: ExecutorState) {
    trace!("{state:?} -> {next:?}");
    *state = next;
}

/// Owns the session for the lifetime of the program and runs one
/// operation at a time against it.
pub struct Executor<S> {
    session: S,
    state: ExecutorState,
}

impl<S: Session> Executor<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            state: ExecutorState::Idle,
        }
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn close(&mut self) -> Result<(), StorageError> {
        self.session.close()
    }

    pub fn create(&mut self, record: &NewRecord) -> Outcome {
        self.mutate(OperationKind::Create, &BoundStatement::insert(record), None)
    }

    pub fn update(&mut self, record: &Record) -> Outcome {
        self.mutate(
            OperationKind::Update,
            &BoundStatement::update(record),
            Some(record.id),
        )
    }

    pub fn delete(&mut self, id: RecordId) -> Outcome {
        self.mutate(OperationKind::Delete, &BoundStatement::delete(id), Some(id))
    }

    /// Stream every record, in key order, into `visit`. Never commits or
    /// rolls back.
    pub fn read_all<F>(&mut self, mut visit: F) -> Result<usize, StorageError>
    where
        F: FnMut(Record),
    {
        self.start()?;
        let result = self.read(&BoundStatement::select_all(), &mut visit);
        enter(&mut self.state, ExecutorState::Idle);
        result
    }

    fn start(&self) -> Result<(), StorageError> {
        match self.state {
            ExecutorState::Idle => Ok(()),
            state => Err(StorageError::Busy(state)),
        }
    }

    fn read(
        &mut self,
        bound: &BoundStatement,
        visit: &mut dyn FnMut(Record),
    ) -> Result<usize, StorageError> {
        enter(&mut self.state, ExecutorState::Preparing);
        let mut prepared = self.session.prepare(bound.statement())?;
        enter(&mut self.state, ExecutorState::Executing);
        prepared.query(bound.params(), visit)
    }

    fn apply(&mut self, bound: &BoundStatement) -> Result<Execution, StorageError> {
        enter(&mut self.state, ExecutorState::Preparing);
        let mut prepared = self.session.prepare(bound.statement())?;
        enter(&mut self.state, ExecutorState::Executing);
        debug!("{} with {:?}", bound.statement().name(), bound.params());
        prepared.execute(bound.params())
    }

    fn mutate(
        &mut self,
        operation: OperationKind,
        bound: &BoundStatement,
        key: Option<RecordId>,
    ) -> Outcome {
        if let Err(error) = self.start() {
            return Outcome::Failed { operation, error };
        }

        let outcome = match self.apply(bound) {
            Ok(execution) if execution.affected > 0 => {
                enter(&mut self.state, ExecutorState::Committing);
                match self.session.commit() {
                    Ok(()) => {
                        let id = key.unwrap_or(execution.last_insert_id);
                        info!("{operation}: {} row(s) committed for ID {id}", execution.affected);
                        Outcome::Committed {
                            operation,
                            id,
                            rows: execution.affected,
                        }
                    }
                    Err(error) => self.roll_back(operation, key, Some(error)),
                }
            }
            Ok(_) => self.roll_back(operation, key, None),
            Err(error) => self.roll_back(operation, key, Some(error)),
        };

        enter(&mut self.state, ExecutorState::Idle);
        outcome
    }

    fn roll_back(
        &mut self,
        operation: OperationKind,
        key: Option<RecordId>,
        cause: Option<StorageError>,
    ) -> Outcome {
        enter(&mut self.state, ExecutorState::RollingBack);
        match (self.session.rollback(), cause) {
            (Ok(()), None) => {
                info!("{operation}: no rows affected, rolled back");
                Outcome::NoEffect { operation, id: key }
            }
            (Ok(()), Some(error)) => {
                warn!("{operation}: rolled back after {error}");
                Outcome::Failed { operation, error }
            }
            (Err(rollback), error) => {
                error!("{operation}: rollback failed, session state is unreliable: {rollback}");
                Outcome::Critical {
                    operation,
                    error,
                    rollback,
                }
            }
        }
    }
}
