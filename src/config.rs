//! Session configuration, optionally read from a TOML file.
//!
//! ```toml
//! [database]
//! db_path = "products.db"
//! create_schema = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Location that opens a private in-memory database.
pub const MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// SQLite session configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or [`MEMORY`]
    pub db_path: String,
    /// Create the product table on connect if it is missing
    pub create_schema: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: "products.db".to_string(),
            create_schema: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    database: SqliteConfig,
}

impl SqliteConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MEMORY)
    }

    /// Expect the table to exist already.
    pub fn without_schema(mut self) -> Self {
        self.create_schema = false;
        self
    }

    pub fn is_memory(&self) -> bool {
        self.db_path == MEMORY
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(file.database)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Combine an optional config file with command-line overrides.
    ///
    /// `memory` beats `database`, which beats the file's `db_path`, which
    /// beats the default.
    pub fn resolve(
        file: Option<&Path>,
        database: Option<String>,
        memory: bool,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if memory {
            config.db_path = MEMORY.to_string();
        } else if let Some(path) = database {
            config.db_path = path;
        }
        Ok(config)
    }
}
