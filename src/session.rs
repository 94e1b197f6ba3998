//! The seam between the executor and a live storage connection.

use crate::error::StorageError;
use crate::record::{Record, RecordId};
use crate::statement::{Statement, Value};

/// Result of running a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Rows the statement actually changed.
    pub affected: usize,
    /// Key of the most recent insert on this connection.
    pub last_insert_id: RecordId,
}

/// A statement prepared on a session. Borrows the session, so it is
/// released before the transaction can be resolved.
pub trait Prepared {
    /// Run a mutating statement, opening a transaction if none is pending.
    fn execute(&mut self, params: &[Value]) -> Result<Execution, StorageError>;

    /// Stream result rows into `visit` one at a time. Opens no transaction.
    fn query(
        &mut self,
        params: &[Value],
        visit: &mut dyn FnMut(Record),
    ) -> Result<usize, StorageError>;
}

/// One live connection with auto-commit disabled.
pub trait Session {
    type Prepared<'s>: Prepared
    where
        Self: 's;

    fn is_connected(&self) -> bool;

    fn prepare(&mut self, statement: Statement) -> Result<Self::Prepared<'_>, StorageError>;

    fn commit(&mut self) -> Result<(), StorageError>;

    fn rollback(&mut self) -> Result<(), StorageError>;

    /// Release the connection. Calling it again, or on a session that
    /// never connected, does nothing.
    fn close(&mut self) -> Result<(), StorageError>;
}
