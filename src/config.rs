//! Connection configuration

use crate::error::{Result, SqliteError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BASE_PATH_ENV: &str = "SQLITE_BASE_PATH";
pub const BUSY_TIMEOUT_ENV: &str = "SQLITE_BUSY_TIMEOUT_MS";

/// Busy timeout applied to every connection unless overridden.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 6000;

/// Largest busy timeout SQLite accepts (its millisecond argument is a C `int`).
pub const MAX_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;

/// SQLite connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Directory database file names are resolved against
    pub base_path: PathBuf,
    /// How long a statement waits on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl SqliteConfig {
    /// Create a config rooted at `base_path` with the default busy timeout
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Set the busy timeout, clamped to [`MAX_BUSY_TIMEOUT_MS`]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .min(MAX_BUSY_TIMEOUT_MS);
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// The busy timeout, or a `Config` error when it exceeds what SQLite accepts.
    ///
    /// `busy_timeout_ms` is public and deserializable, so it is checked again here.
    pub fn checked_busy_timeout(&self) -> Result<Duration> {
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(SqliteError::Config(format!(
                "busy timeout of {} ms exceeds the maximum of {MAX_BUSY_TIMEOUT_MS} ms",
                self.busy_timeout_ms
            )));
        }
        Ok(self.busy_timeout())
    }

    /// Location of the database file `name` under the base directory
    pub fn database_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.base_path.join(name)
    }

    /// Read `SQLITE_BASE_PATH` and `SQLITE_BUSY_TIMEOUT_MS`; unset variables keep defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base) = lookup(BASE_PATH_ENV).filter(|v| !v.is_empty()) {
            config.base_path = PathBuf::from(base);
        }
        if let Some(raw) = lookup(BUSY_TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            config.busy_timeout_ms = raw.trim().parse().map_err(|e| {
                SqliteError::Config(format!("{BUSY_TIMEOUT_ENV}={raw:?} is not a millisecond count: {e}"))
            })?;
            config.checked_busy_timeout()?;
        }
        Ok(config)
    }
}
