use log::{debug, error, info, warn};
use rusqlite::{params_from_iter, CachedStatement, Connection};

use crate::config::SqliteConfig;
use crate::error::StorageError;
use crate::record::Record;
use crate::session::{Execution, Prepared, Session};
use crate::statement::{Statement, Value, TABLE};

/// Table definition used to create the backing table
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnDefinition::sql)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({});", self.name, columns)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(&constraint.sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
    Real,
}

impl DataType {
    fn sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey { autoincrement: bool },
    NotNull,
    Check(String),
}

impl ColumnConstraint {
    fn sql(&self) -> String {
        match self {
            ColumnConstraint::PrimaryKey { autoincrement: true } => {
                "PRIMARY KEY AUTOINCREMENT".to_string()
            }
            ColumnConstraint::PrimaryKey { autoincrement: false } => "PRIMARY KEY".to_string(),
            ColumnConstraint::NotNull => "NOT NULL".to_string(),
            ColumnConstraint::Check(expr) => format!("CHECK ({expr})"),
        }
    }
}

/// The `product` table the statement catalog is written against.
pub fn product_table() -> TableDefinition {
    TableDefinition::new(TABLE)
        .add_column(
            ColumnDefinition::new("id", DataType::Integer)
                .with_constraint(ColumnConstraint::PrimaryKey { autoincrement: true }),
        )
        .add_column(
            ColumnDefinition::new("name", DataType::Text)
                .with_constraint(ColumnConstraint::NotNull)
                .with_constraint(ColumnConstraint::Check("length(name) > 0".to_string())),
        )
        .add_column(
            ColumnDefinition::new("price", DataType::Real)
                .with_constraint(ColumnConstraint::NotNull)
                .with_constraint(ColumnConstraint::Check("price >= 0".to_string())),
        )
        .add_column(
            ColumnDefinition::new("quantity", DataType::Integer)
                .with_constraint(ColumnConstraint::NotNull)
                .with_constraint(ColumnConstraint::Check("quantity >= 0".to_string())),
        )
}

/// The single SQLite connection of a run.
///
/// Starts disconnected. Auto-commit is off from the caller's point of view:
/// the first mutating statement after a commit or rollback opens a
/// transaction, and only [`Session::commit`] or [`Session::rollback`] ends it.
pub struct SqliteSession {
    config: SqliteConfig,
    connection: Option<Connection>,
}

impl SqliteSession {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Create a session and connect it.
    pub fn open(config: SqliteConfig) -> Result<Self, StorageError> {
        let mut session = Self::new(config);
        session.connect()?;
        Ok(session)
    }

    pub fn connect(&mut self) -> Result<(), StorageError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let location = self.config.db_path.clone();
        let opened = if self.config.is_memory() {
            Connection::open_in_memory()
        } else {
            Connection::open(&location)
        };
        let connection = opened.map_err(|e| StorageError::Connect {
            location: location.clone(),
            message: e.to_string(),
        })?;

        if self.config.create_schema {
            initialize_schema(&connection)?;
        }

        info!("connected to {location}, auto-commit disabled");
        self.connection = Some(connection);
        Ok(())
    }

    /// Whether a transaction is open and waiting for commit or rollback.
    pub fn in_transaction(&self) -> bool {
        self.connection
            .as_ref()
            .map(|c| !c.is_autocommit())
            .unwrap_or(false)
    }

    fn connection(&self) -> Result<&Connection, StorageError> {
        self.connection.as_ref().ok_or(StorageError::NotConnected)
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("{e}");
        }
    }
}

fn initialize_schema(conn: &Connection) -> Result<(), StorageError> {
    let sql = product_table().create_sql();
    debug!("{sql}");
    conn.execute_batch(&sql)
        .map_err(|e| StorageError::Schema(e.to_string()))
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        unit_price: row.get(2)?,
        quantity: row.get(3)?,
    })
}

fn execute_error(statement: Statement, e: rusqlite::Error) -> StorageError {
    StorageError::Execute {
        statement: statement.name(),
        message: e.to_string(),
    }
}

pub struct SqlitePrepared<'c> {
    connection: &'c Connection,
    statement: Statement,
    inner: CachedStatement<'c>,
}

impl Prepared for SqlitePrepared<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<Execution, StorageError> {
        let statement = self.statement;
        if statement.is_mutating() && self.connection.is_autocommit() {
            self.connection
                .execute_batch("BEGIN")
                .map_err(|e| execute_error(statement, e))?;
            debug!("transaction opened");
        }

        let affected = self
            .inner
            .execute(params_from_iter(params.iter()))
            .map_err(|e| execute_error(statement, e))?;

        Ok(Execution {
            affected,
            last_insert_id: self.connection.last_insert_rowid(),
        })
    }

    fn query(
        &mut self,
        params: &[Value],
        visit: &mut dyn FnMut(Record),
    ) -> Result<usize, StorageError> {
        let statement = self.statement;
        let mut rows = self
            .inner
            .query(params_from_iter(params.iter()))
            .map_err(|e| execute_error(statement, e))?;

        let mut visited = 0;
        while let Some(row) = rows.next().map_err(|e| execute_error(statement, e))? {
            visit(record_from_row(row).map_err(|e| execute_error(statement, e))?);
            visited += 1;
        }
        Ok(visited)
    }
}

impl Session for SqliteSession {
    type Prepared<'s> = SqlitePrepared<'s>;

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn prepare(&mut self, statement: Statement) -> Result<SqlitePrepared<'_>, StorageError> {
        let connection = self.connection()?;
        debug!("prepare {}: {}", statement.name(), statement.sql());
        let inner = connection
            .prepare_cached(statement.sql())
            .map_err(|e| StorageError::Prepare {
                statement: statement.name(),
                message: e.to_string(),
            })?;
        Ok(SqlitePrepared {
            connection,
            statement,
            inner,
        })
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        let connection = self.connection()?;
        if connection.is_autocommit() {
            debug!("commit: no pending transaction");
            return Ok(());
        }
        connection
            .execute_batch("COMMIT")
            .map_err(|e| StorageError::Commit(e.to_string()))
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        // SQLite ends the transaction itself on some errors, so an absent
        // transaction is not a failure here.
        let Some(connection) = self.connection.as_ref() else {
            debug!("rollback: not connected");
            return Ok(());
        };
        if connection.is_autocommit() {
            debug!("rollback: no pending transaction");
            return Ok(());
        }
        connection
            .execute_batch("ROLLBACK")
            .map_err(|e| StorageError::Rollback(e.to_string()))
    }

    fn close(&mut self) -> Result<(), StorageError> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        if !connection.is_autocommit() {
            warn!("closing with a pending transaction, rolling it back");
            if let Err(e) = connection.execute_batch("ROLLBACK") {
                error!("rollback on close failed: {e}");
            }
        }

        connection
            .close()
            .map_err(|(_, e)| StorageError::Close(e.to_string()))?;
        info!("connection to {} closed", self.config.db_path);
        Ok(())
    }
}
