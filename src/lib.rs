//! Generic SQLite helpers over a caller-owned [`rusqlite::Connection`].
//!
//! # Intention
//!
//! - Provide one small API for the everyday chores: open, introspect, query,
//!   batch insert, update, delete and run scripts.
//! - Return explicit [`Result`]s so "nothing found" never looks like "failed".
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No pooling, statement caching, migrations or query DSL.
//! - The connection is owned by the caller; nothing here keeps state.
//!
//! ```no_run
//! use sqlite_utils::{sqlite, Row, SqliteConfig, Value};
//!
//! # fn main() -> sqlite_utils::Result<()> {
//! let config = SqliteConfig::new("/var/lib/app");
//! let mut conn = sqlite::open(&config, "share.db")?;
//! sqlite::create_table(&conn, "CREATE TABLE IF NOT EXISTS t (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//! let row = Row::from([
//!     ("id".to_string(), Value::from(1)),
//!     ("name".to_string(), Value::from("Alice")),
//! ]);
//! sqlite::batch_insert(&mut conn, "t", &[row])?;
//! let rows = sqlite::query_all_from_table(&conn, "t")?;
//! assert_eq!(rows.len(), 1);
//! sqlite::close(conn)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod sqlite;
pub mod value;

#[cfg(feature = "compat")]
pub mod compat;

pub use config::SqliteConfig;
pub use error::{ErrorKind, Result, SqliteError};
pub use value::{Condition, Params, Row, SqlQuery, Value};
