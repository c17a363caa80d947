//! "Log and continue" wrappers over [`crate::sqlite`].
//!
//! Every failure is logged at `error` level and turned into a sentinel:
//! `false`, `0`, `None` or an empty `Vec`. Callers cannot tell "found nothing"
//! from "failed" here; use [`crate::sqlite`] when that matters.
//!
//! `insert_or_update` rolls a failed statement back instead of committing it.

use crate::config::SqliteConfig;
use crate::error::SqliteError;
use crate::sqlite;
use crate::value::{Condition, Row, SqlQuery, Value};
use rusqlite::Connection;
use tracing::error;

fn or_sentinel<T>(operation: &'static str, result: Result<T, SqliteError>, sentinel: T) -> T {
    result.unwrap_or_else(|err| {
        error!(operation, kind = ?err.kind(), error = %err, "sqlite operation failed");
        sentinel
    })
}

fn logged<T>(operation: &'static str, result: Result<T, SqliteError>) -> Option<T> {
    or_sentinel(operation, result.map(Some), None)
}

pub fn get_connection(config: &SqliteConfig, name: &str) -> Option<Connection> {
    logged("get_connection", sqlite::open(config, name))
}

/// Close and clear the handle. Returns `false` if it was already closed or closing failed.
pub fn close_connection(conn: &mut Option<Connection>) -> bool {
    match conn.take() {
        Some(conn) => or_sentinel("close_connection", sqlite::close(conn).map(|()| true), false),
        None => {
            error!(operation = "close_connection", "connection already closed");
            false
        }
    }
}

pub fn check_table_exists(conn: &Connection, table: &str) -> bool {
    or_sentinel("check_table_exists", sqlite::table_exists(conn, table), false)
}

pub fn execute_count(conn: &Connection, query: impl Into<SqlQuery>) -> i64 {
    or_sentinel("execute_count", sqlite::count(conn, query), 0)
}

pub fn get_col_names(conn: &Connection, table: &str) -> Vec<String> {
    or_sentinel("get_col_names", sqlite::column_names(conn, table), Vec::new())
}

/// `None` on failure; `Some(vec![])` when the query matched nothing.
pub fn query_all(conn: &Connection, query: impl Into<SqlQuery>) -> Option<Vec<Row>> {
    logged("query_all", sqlite::query_all(conn, query))
}

pub fn query_all_from_table(conn: &Connection, table: &str) -> Option<Vec<Row>> {
    logged("query_all_from_table", sqlite::query_all_from_table(conn, table))
}

pub fn query_single_row(conn: &Connection, query: impl Into<SqlQuery>) -> Option<Row> {
    logged("query_single_row", sqlite::query_single_row(conn, query)).flatten()
}

pub fn query_single_value(conn: &Connection, query: impl Into<SqlQuery>) -> Option<Value> {
    logged("query_single_value", sqlite::query_single_value(conn, query)).flatten()
}

pub fn create_table(conn: &Connection, ddl: &str) -> bool {
    or_sentinel("create_table", sqlite::create_table(conn, ddl).map(|()| true), false)
}

pub fn execute_update_sql(conn: &Connection, query: impl Into<SqlQuery>) -> bool {
    or_sentinel("execute_update_sql", sqlite::execute_update(conn, query).map(|_| true), false)
}

pub fn insert_or_update(conn: &mut Connection, query: impl Into<SqlQuery>) -> usize {
    or_sentinel("insert_or_update", sqlite::insert_or_update(conn, query), 0)
}

pub fn batch_insert(conn: &mut Connection, table: &str, rows: &[Row]) -> usize {
    or_sentinel("batch_insert", sqlite::batch_insert(conn, table, rows), 0)
}

pub fn update(conn: &Connection, table: &str, data: &Row, condition: impl Into<Condition>) -> usize {
    or_sentinel("update", sqlite::update(conn, table, data, condition), 0)
}

pub fn delete(conn: &Connection, table: &str, condition: impl Into<Condition>) -> usize {
    or_sentinel("delete", sqlite::delete(conn, table, condition), 0)
}

pub fn execute_sql_script(conn: &Connection, script: &str) -> bool {
    or_sentinel("execute_sql_script", sqlite::execute_sql_script(conn, script).map(|()| true), false)
}
