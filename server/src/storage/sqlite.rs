//! Relational adapter: one row per `(app, env, key)` triple in a `configs`
//! table with that triple as primary key. Scope-level replaces run inside a
//! transaction, so a failed replace leaves the previous rows intact. This
//! is the only backend with multi-unit atomicity.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Transaction};
use shared_types::{AppConfig, EnvConfig, EnvKey};
use std::sync::{Mutex, MutexGuard};

use super::traits::StorageBackend;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS configs (
    app_name   TEXT NOT NULL,
    env_name   TEXT NOT NULL,
    config_key TEXT NOT NULL,
    config_val TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (app_name, env_name, config_key)
);
CREATE INDEX IF NOT EXISTS idx_configs_app_env ON configs (app_name, env_name);
";

pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite database")?;
        Self::with_connection(conn)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("failed to open in-memory sqlite database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("failed to initialize configs table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }
}

/// Inserts every pair of `block` for `(app, env)`. Caller owns the
/// transaction boundary.
fn insert_block(tx: &Transaction<'_>, app: &str, env: &str, block: &EnvConfig) -> Result<()> {
    let now = Utc::now();
    let mut stmt = tx.prepare(
        "INSERT INTO configs (app_name, env_name, config_key, config_val, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (key, value) in block {
        stmt.execute(params![app, env, key, value, now, now])?;
    }
    Ok(())
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn list_blocks(&self, app: Option<&str>, env: Option<&str>) -> Result<Vec<EnvKey>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT app_name, env_name FROM configs \
             WHERE (?1 IS NULL OR app_name = ?1) AND (?2 IS NULL OR env_name = ?2) \
             ORDER BY app_name, env_name",
        )?;
        let keys = stmt
            .query_map(params![app, env], |row| {
                Ok(EnvKey::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to list blocks")?;
        Ok(keys)
    }

    async fn read_block(&self, key: &EnvKey) -> Result<Option<EnvConfig>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT config_key, config_val FROM configs WHERE app_name = ?1 AND env_name = ?2",
        )?;
        let rows = stmt.query_map(params![key.application, key.environment], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
            ))
        })?;

        let mut block = EnvConfig::new();
        let mut found = false;
        for row in rows {
            let (k, v) = row.with_context(|| format!("failed to read block {key}"))?;
            block.insert(k, v.unwrap_or_default());
            found = true;
        }
        // No rows means the environment is absent: an empty block is not
        // representable in this backend.
        Ok(found.then_some(block))
    }

    async fn write_block(&self, key: &EnvKey, block: &EnvConfig) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM configs WHERE app_name = ?1 AND env_name = ?2",
            params![key.application, key.environment],
        )?;
        insert_block(&tx, &key.application, &key.environment, block)?;
        tx.commit()
            .with_context(|| format!("failed to replace block {key}"))
    }

    async fn delete_block(&self, key: &EnvKey) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "DELETE FROM configs WHERE app_name = ?1 AND env_name = ?2",
            params![key.application, key.environment],
        )
        .with_context(|| format!("failed to delete block {key}"))?;
        Ok(())
    }

    async fn replace_app(&self, app: &str, config: &AppConfig) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM configs WHERE app_name = ?1", params![app])?;
        for (env, block) in config {
            insert_block(&tx, app, env, block)?;
        }
        tx.commit()
            .with_context(|| format!("failed to replace configuration of '{app}'"))
    }

    async fn delete_app(&self, app: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM configs WHERE app_name = ?1", params![app])
            .with_context(|| format!("failed to delete configuration of '{app}'"))?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM configs", [])
            .context("failed to clear configs table")?;
        Ok(())
    }
}
