use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::FormatError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid table `{table}`")]
    Config {
        table: String,
        #[source]
        source: ConfigError,
    },
    #[error("array resource `{name}` is already owned by `{qualified}`")]
    AlreadyResolved { name: String, qualified: String },
    #[error("`{0}` was emitted before name resolution")]
    Unresolved(String),
    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render artifact: {0}")]
    Fmt(#[from] fmt::Error),
}

/// Problems with a table description, detected before anything is emitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyName(&'static str),
    #[error("table has no entries")]
    EmptyTable,
    #[error("key `{0}` is not a valid identifier fragment")]
    InvalidKey(String),
    #[error("duplicate key `{0}`")]
    DuplicateKey(String),
    #[error("identifier `{0}` is generated more than once")]
    DuplicateIdentifier(String),
    #[error("array resource `{0}` has no values")]
    EmptyArray(String),
    #[error("array resource `{0}` needs at least one value per line")]
    ZeroValuesPerLine(String),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl CoreError {
    pub(crate) fn config(table: impl Into<String>, source: impl Into<ConfigError>) -> Self {
        CoreError::Config {
            table: table.into(),
            source: source.into(),
        }
    }
}
