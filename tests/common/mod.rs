#![allow(dead_code)]

use rust_product_store::{Execution, Prepared, Record, Session, Statement, StorageError, Value};

/// Everything a session was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare(Statement),
    Execute(Statement, Vec<Value>),
    Query(Statement),
    Commit,
    Rollback,
    Close,
}

/// Canned results and injected failures.
#[derive(Debug, Default, Clone)]
pub struct Script {
    pub affected: usize,
    pub last_insert_id: i64,
    pub rows: Vec<Record>,
    pub fail_prepare: bool,
    pub fail_execute: bool,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    pub fail_close: bool,
}

pub struct RecordingSession {
    pub calls: Vec<Call>,
    pub script: Script,
    connected: bool,
}

impl RecordingSession {
    pub fn new(script: Script) -> Self {
        Self {
            calls: Vec::new(),
            script,
            connected: true,
        }
    }

    pub fn affecting(rows: usize) -> Self {
        Self::new(Script {
            affected: rows,
            last_insert_id: 42,
            ..Script::default()
        })
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn commits(&self) -> usize {
        self.count(&Call::Commit)
    }

    pub fn rollbacks(&self) -> usize {
        self.count(&Call::Rollback)
    }
}

pub struct RecordingPrepared<'s> {
    session: &'s mut RecordingSession,
    statement: Statement,
}

impl Prepared for RecordingPrepared<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<Execution, StorageError> {
        self.session
            .calls
            .push(Call::Execute(self.statement, params.to_vec()));
        if self.session.script.fail_execute {
            return Err(StorageError::Execute {
                statement: self.statement.name(),
                message: "disk I/O error".to_string(),
            });
        }
        Ok(Execution {
            affected: self.session.script.affected,
            last_insert_id: self.session.script.last_insert_id,
        })
    }

    fn query(
        &mut self,
        _params: &[Value],
        visit: &mut dyn FnMut(Record),
    ) -> Result<usize, StorageError> {
        self.session.calls.push(Call::Query(self.statement));
        if self.session.script.fail_execute {
            return Err(StorageError::Execute {
                statement: self.statement.name(),
                message: "no such table: product".to_string(),
            });
        }
        let rows = self.session.script.rows.clone();
        let visited = rows.len();
        rows.into_iter().for_each(|r| visit(r));
        Ok(visited)
    }
}

impl Session for RecordingSession {
    type Prepared<'s> = RecordingPrepared<'s>;

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn prepare(&mut self, statement: Statement) -> Result<RecordingPrepared<'_>, StorageError> {
        self.calls.push(Call::Prepare(statement));
        if self.script.fail_prepare {
            return Err(StorageError::Prepare {
                statement: statement.name(),
                message: "syntax error".to_string(),
            });
        }
        Ok(RecordingPrepared {
            session: self,
            statement,
        })
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.calls.push(Call::Commit);
        if self.script.fail_commit {
            return Err(StorageError::Commit("database is locked".to_string()));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        self.calls.push(Call::Rollback);
        if self.script.fail_rollback {
            return Err(StorageError::Rollback("connection lost".to_string()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        if !self.connected {
            return Ok(());
        }
        self.calls.push(Call::Close);
        self.connected = false;
        if self.script.fail_close {
            return Err(StorageError::Close("unfinalized statements".to_string()));
        }
        Ok(())
    }
}
