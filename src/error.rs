//! Error types for SQLite helpers

use std::path::PathBuf;
use thiserror::Error;

/// Every failure the helpers can report.
///
/// Driver errors are kept as the `source` together with the SQL that failed.
#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("failed to open database {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to close database: {0}")]
    Close(#[source] rusqlite::Error),

    #[error("schema operation failed `{sql}`: {source}")]
    Schema {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed `{sql}`: {source}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("mutation failed `{sql}`: {source}")]
    Mutation {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse category of a [`SqliteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Schema,
    Query,
    Mutation,
    InvalidInput,
    Config,
}

impl SqliteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqliteError::Connection { .. } | SqliteError::Close(_) => ErrorKind::Connection,
            SqliteError::Schema { .. } => ErrorKind::Schema,
            SqliteError::Query { .. } => ErrorKind::Query,
            SqliteError::Mutation { .. } => ErrorKind::Mutation,
            SqliteError::InvalidInput(_) => ErrorKind::InvalidInput,
            SqliteError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn schema(sql: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let sql = sql.into();
        move |source| SqliteError::Schema { sql, source }
    }

    pub(crate) fn query(sql: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let sql = sql.into();
        move |source| SqliteError::Query { sql, source }
    }

    pub(crate) fn mutation(sql: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let sql = sql.into();
        move |source| SqliteError::Mutation { sql, source }
    }
}

pub type Result<T> = std::result::Result<T, SqliteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_groups_open_and_close_failures() {
        let open = SqliteError::Connection {
            path: PathBuf::from("/nowhere/x.db"),
            source: rusqlite::Error::InvalidQuery,
        };
        let close = SqliteError::Close(rusqlite::Error::InvalidQuery);
        assert_eq!(open.kind(), ErrorKind::Connection);
        assert_eq!(close.kind(), ErrorKind::Connection);
    }

    #[test]
    fn message_carries_failing_sql() {
        let err = SqliteError::query("SELECT nope")(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ErrorKind::Query);
        assert!(err.to_string().contains("SELECT nope"));
    }
}
