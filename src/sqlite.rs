//! Connection, introspection, query and mutation helpers.
//!
//! Every function borrows a caller-owned [`Connection`]. Statements and row
//! cursors never outlive the call that created them, and the transactional
//! helpers always end in commit or rollback before returning.

use crate::config::SqliteConfig;
use crate::error::{Result, SqliteError};
use crate::value::{Condition, Row, SqlQuery, Value};
use rusqlite::{params_from_iter, Connection, Statement, Transaction};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};

// ========== Connection Management ==========

/// Open (creating if absent) the database file `name` under the configured base path.
///
/// A busy timeout above [`crate::config::MAX_BUSY_TIMEOUT_MS`] is a `Config` error
/// and nothing is opened.
pub fn open(config: &SqliteConfig, name: &str) -> Result<Connection> {
    let timeout = config.checked_busy_timeout()?;
    let path = config.database_path(name);
    debug!(path = %path.display(), busy_timeout_ms = config.busy_timeout_ms, "opening sqlite database");
    let conn = Connection::open(&path).map_err(|source| SqliteError::Connection {
        path: path.clone(),
        source,
    })?;
    conn.busy_timeout(timeout)
        .map_err(|source| SqliteError::Connection { path, source })?;
    Ok(conn)
}

/// Open a private in-memory database with the configured busy timeout.
pub fn open_in_memory(config: &SqliteConfig) -> Result<Connection> {
    let timeout = config.checked_busy_timeout()?;
    let path = PathBuf::from(":memory:");
    let conn = Connection::open_in_memory().map_err(|source| SqliteError::Connection {
        path: path.clone(),
        source,
    })?;
    conn.busy_timeout(timeout)
        .map_err(|source| SqliteError::Connection { path, source })?;
    Ok(conn)
}

/// Close the connection, surfacing any error the driver reports.
pub fn close(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_conn, source)| SqliteError::Close(source))
}

// ========== Schema Introspection ==========

/// Whether a table called `name` exists
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    const SQL: &str = "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
    let found: i64 = conn
        .query_row(SQL, [name], |row| row.get(0))
        .map_err(SqliteError::schema(SQL))?;
    Ok(found > 0)
}

/// Column names of `table`, read from the prepared `SELECT *` without stepping it.
pub fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let sql = format!("SELECT * FROM {}", quote_identifier(table));
    let stmt = conn.prepare(&sql).map_err(SqliteError::schema(&sql))?;
    Ok(stmt.column_names().into_iter().map(String::from).collect())
}

// ========== Query Execution ==========

/// Run a read statement and materialize every row.
pub fn query_all(conn: &Connection, query: impl Into<SqlQuery>) -> Result<Vec<Row>> {
    let query = query.into();
    debug!(sql = %query.statement, "query_all");
    read_rows(conn, &query, None).map_err(SqliteError::query(&query.statement))
}

/// Every row of `table`
pub fn query_all_from_table(conn: &Connection, table: &str) -> Result<Vec<Row>> {
    query_all(conn, format!("SELECT * FROM {}", quote_identifier(table)))
}

/// First row of the result, or `None` when nothing matches.
pub fn query_single_row(conn: &Connection, query: impl Into<SqlQuery>) -> Result<Option<Row>> {
    let query = query.into();
    debug!(sql = %query.statement, "query_single_row");
    let rows = read_rows(conn, &query, Some(1)).map_err(SqliteError::query(&query.statement))?;
    Ok(rows.into_iter().next())
}

/// First column of the first row, or `None` when nothing matches.
pub fn query_single_value(conn: &Connection, query: impl Into<SqlQuery>) -> Result<Option<Value>> {
    let query = query.into();
    debug!(sql = %query.statement, "query_single_value");
    let read = || -> rusqlite::Result<Option<Value>> {
        let mut stmt = prepare_bound(conn, &query)?;
        let mut rows = stmt.raw_query();
        let value = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        Ok(value)
    };
    read().map_err(SqliteError::query(&query.statement))
}

/// Result of a single-column aggregate such as `SELECT count(*) ...`.
///
/// No row and a NULL aggregate both count as 0. With several rows the last one wins.
pub fn count(conn: &Connection, query: impl Into<SqlQuery>) -> Result<i64> {
    let query = query.into();
    debug!(sql = %query.statement, "count");
    let read = || -> rusqlite::Result<i64> {
        let mut stmt = prepare_bound(conn, &query)?;
        let mut rows = stmt.raw_query();
        let mut total = 0;
        while let Some(row) = rows.next()? {
            total = row.get::<_, Option<i64>>(0)?.unwrap_or(0);
        }
        Ok(total)
    };
    read().map_err(SqliteError::query(&query.statement))
}

// ========== Mutation Execution ==========

/// Execute a single DDL statement
pub fn create_table(conn: &Connection, ddl: &str) -> Result<()> {
    debug!(sql = %ddl, "create_table");
    conn.execute(ddl, []).map_err(SqliteError::schema(ddl))?;
    Ok(())
}

/// Execute one statement in autocommit mode, returning the affected-row count.
pub fn execute_update(conn: &Connection, query: impl Into<SqlQuery>) -> Result<usize> {
    let query = query.into();
    debug!(sql = %query.statement, "execute_update");
    execute_bound(conn, &query).map_err(SqliteError::mutation(&query.statement))
}

/// Execute one statement inside its own transaction.
///
/// A failed statement is rolled back, never committed.
pub fn insert_or_update(conn: &mut Connection, query: impl Into<SqlQuery>) -> Result<usize> {
    let query = query.into();
    debug!(sql = %query.statement, "insert_or_update");
    let tx = conn
        .transaction()
        .map_err(SqliteError::mutation(&query.statement))?;
    match execute_bound(&tx, &query) {
        Ok(changed) => {
            tx.commit().map_err(SqliteError::mutation(&query.statement))?;
            Ok(changed)
        }
        Err(source) => {
            rollback(tx, &query.statement);
            Err(SqliteError::Mutation {
                sql: query.statement,
                source,
            })
        }
    }
}

/// Insert every row with one prepared statement inside one transaction.
///
/// Columns come from the first row; every other row must have exactly the same
/// columns. Either all rows are committed or none are.
pub fn batch_insert(conn: &mut Connection, table: &str, rows: &[Row]) -> Result<usize> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    if let Some(index) = rows.iter().position(|row| !row.keys().eq(first.keys())) {
        let found: BTreeSet<&str> = rows[index].keys().map(String::as_str).collect();
        return Err(SqliteError::InvalidInput(format!(
            "row {index} has columns {found:?}, expected {columns:?}"
        )));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        columns.iter().map(|c| quote_identifier(c)).collect::<Vec<_>>().join(", "),
        vec!["?"; columns.len()].join(", ")
    );
    debug!(sql = %sql, rows = rows.len(), "batch_insert");

    let tx = conn.transaction().map_err(SqliteError::mutation(&sql))?;
    let inserted = insert_rows(&tx, &sql, rows);
    match inserted {
        Ok(inserted) => {
            tx.commit().map_err(SqliteError::mutation(&sql))?;
            Ok(inserted)
        }
        Err(source) => {
            rollback(tx, &sql);
            Err(SqliteError::Mutation { sql, source })
        }
    }
}

/// `UPDATE table SET col = ?, ... WHERE condition`, binding data then condition values.
///
/// Empty `data` is a no-op returning 0.
pub fn update(
    conn: &Connection,
    table: &str,
    data: &Row,
    condition: impl Into<Condition>,
) -> Result<usize> {
    if data.is_empty() {
        return Ok(0);
    }
    let condition = condition.into();
    let assignments = data
        .keys()
        .map(|column| format!("{} = ?", quote_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        quote_identifier(table),
        assignments,
        condition.clause
    );
    debug!(sql = %sql, "update");
    conn.execute(&sql, params_from_iter(data.values().chain(&condition.values)))
        .map_err(SqliteError::mutation(sql))
}

/// `DELETE FROM table WHERE condition`, returning the number of removed rows
pub fn delete(conn: &Connection, table: &str, condition: impl Into<Condition>) -> Result<usize> {
    let condition = condition.into();
    let sql = format!("DELETE FROM {} WHERE {}", quote_identifier(table), condition.clause);
    debug!(sql = %sql, "delete");
    conn.execute(&sql, params_from_iter(&condition.values))
        .map_err(SqliteError::mutation(sql))
}

/// Run a script of one or more `;`-separated statements.
pub fn execute_sql_script(conn: &Connection, script: &str) -> Result<()> {
    debug!(bytes = script.len(), "execute_sql_script");
    conn.execute_batch(script).map_err(SqliteError::mutation(script))
}

// ========== Helpers ==========

/// Double-quote an identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn prepare_bound<'conn>(conn: &'conn Connection, query: &SqlQuery) -> rusqlite::Result<Statement<'conn>> {
    let mut stmt = conn.prepare(&query.statement)?;
    let params = &query.params;
    let expected = stmt.parameter_count();
    if params.len() != expected {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected));
    }
    // `?` takes the next free index after any `:name`, so positional values go to
    // the unnamed (or `?NNN`) slots in index order.
    let positional_slots: Vec<usize> = (1..=expected)
        .filter(|&index| stmt.parameter_name(index).map_or(true, |name| name.starts_with('?')))
        .collect();
    if positional_slots.len() != params.positional.len() {
        return Err(rusqlite::Error::InvalidParameterCount(
            params.positional.len(),
            positional_slots.len(),
        ));
    }
    for (index, value) in positional_slots.into_iter().zip(&params.positional) {
        stmt.raw_bind_parameter(index, value)?;
    }
    for (name, value) in &params.named {
        let index = stmt
            .parameter_index(name)?
            .ok_or_else(|| rusqlite::Error::InvalidParameterName(name.clone()))?;
        stmt.raw_bind_parameter(index, value)?;
    }
    Ok(stmt)
}

fn execute_bound(conn: &Connection, query: &SqlQuery) -> rusqlite::Result<usize> {
    prepare_bound(conn, query)?.raw_execute()
}

fn insert_rows(conn: &Connection, sql: &str, rows: &[Row]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(sql)?;
    let mut inserted = 0;
    for row in rows {
        inserted += stmt.execute(params_from_iter(row.values()))?;
    }
    Ok(inserted)
}

fn read_rows(conn: &Connection, query: &SqlQuery, limit: Option<usize>) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = prepare_bound(conn, query)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.raw_query();
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut map = Row::new();
        for (index, column) in columns.iter().enumerate() {
            map.insert(column.clone(), row.get(index)?);
        }
        out.push(map);
        if limit.is_some_and(|limit| out.len() >= limit) {
            break;
        }
    }
    Ok(out)
}

fn rollback(tx: Transaction<'_>, sql: &str) {
    if let Err(err) = tx.rollback() {
        warn!(sql = %sql, error = %err, "rollback failed");
    } else {
        warn!(sql = %sql, "rolled back after failed statement");
    }
}
