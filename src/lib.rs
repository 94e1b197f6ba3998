//! Transactional product records over SQLite.
//!
//! # Intention
//!
//! - Run every user-issued create/read/update/delete as one parameterized
//!   statement on a single long-lived connection.
//! - Commit only on a confirmed effect; roll back on no effect or on any
//!   storage failure, and keep the session usable afterwards.
//!
//! # Architectural Boundaries
//!
//! - [`sqlite`] owns the connection and the table definition.
//! - [`executor`] owns the commit/rollback decision.
//! - [`dispatch`] validates raw input and is the only entry point the
//!   console ([`menu`]) talks to.
//! - No pooling, no concurrent clients, no migrations.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod menu;
pub mod record;
pub mod report;
pub mod session;
pub mod sqlite;
pub mod statement;

pub use config::{ConfigError, SqliteConfig, MEMORY};
pub use dispatch::{Dispatcher, Request, Response, Selection};
pub use error::{InputError, StorageError};
pub use executor::{Executor, ExecutorState, OperationKind, Outcome};
pub use record::{NewRecord, Record, RecordId};
pub use report::{FailureClass, Report};
pub use session::{Execution, Prepared, Session};
pub use sqlite::SqliteSession;
pub use statement::{BoundStatement, Statement, Value};
