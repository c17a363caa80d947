//! Opens `share.db` under `SQLITE_BASE_PATH`, writes two rows and prints the table.

use anyhow::{Context, Result};
use sqlite_utils::{sqlite, Row, SqliteConfig, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlite_utils=debug,sqlite_utils_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SqliteConfig::from_env()?;
    let mut conn = sqlite::open(&config, "share.db")?;

    sqlite::create_table(
        &conn,
        "CREATE TABLE IF NOT EXISTS test_table (id INTEGER PRIMARY KEY, name TEXT)",
    )?;

    let rows: Vec<Row> = [(1, "Alice"), (2, "Bob")]
        .into_iter()
        .map(|(id, name)| {
            Row::from([
                ("id".to_string(), Value::from(id)),
                ("name".to_string(), Value::from(name)),
            ])
        })
        .collect();
    let inserted = sqlite::batch_insert(&mut conn, "test_table", &rows)
        .context("inserting demo rows (run against a fresh database)")?;
    info!(inserted, "batch insert done");

    for row in sqlite::query_all_from_table(&conn, "test_table")? {
        println!("{row:?}");
    }

    sqlite::close(conn)?;
    Ok(())
}
