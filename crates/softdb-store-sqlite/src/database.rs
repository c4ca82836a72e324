//! [`Database`] — the shared connection every repository queries through.

use std::{path::Path, sync::Arc};

use rusqlite::{OptionalExtension as _, ToSql};
use tracing::{debug, info};

use crate::{
  Error, Result,
  schema::{PRAGMAS, ddl, is_valid_prefix, seed_roots},
};

/// A SQLite connection plus the table prefix of this deployment.
///
/// Cloning is cheap: the inner connection is reference-counted, and every
/// clone talks to the same database thread.
#[derive(Clone)]
pub struct Database {
  conn:   tokio_rusqlite::Connection,
  prefix: Arc<str>,
}

impl Database {
  /// Open (or create) the database at `path`. Does not create tables; see
  /// [`Database::setup`].
  pub async fn open(path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
    check_prefix(prefix)?;
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, prefix).await
  }

  /// Open an in-memory database, useful for testing.
  pub async fn open_in_memory(prefix: &str) -> Result<Self> {
    check_prefix(prefix)?;
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, prefix).await
  }

  async fn init(conn: tokio_rusqlite::Connection, prefix: &str) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, prefix: Arc::from(prefix) })
  }

  /// The fully qualified name of logical table `name`.
  pub fn table(&self, name: &str) -> String { format!("{}{name}", self.prefix) }

  /// Create every missing table and index, then seed the root subjects.
  pub async fn setup(&self) -> Result<()> {
    let schema = ddl(&self.prefix);
    let seed = seed_roots(&self.prefix);

    let seeded = self
      .call(move |conn| {
        conn.execute_batch(&schema)?;
        Ok(conn.execute(&seed, [])?)
      })
      .await?;

    info!(prefix = %self.prefix, seeded, "database schema ready");
    Ok(())
  }

  /// Run `f` on the database thread.
  pub(crate) async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    Ok(self.conn.call(f).await?)
  }
}

fn check_prefix(prefix: &str) -> Result<()> {
  if is_valid_prefix(prefix) {
    Ok(())
  } else {
    Err(Error::InvalidPrefix(prefix.to_owned()))
  }
}

/// Resolve a unique key to its row id with a single-column `SELECT id …`.
pub(crate) fn find_id(
  conn: &rusqlite::Connection,
  sql: &str,
  key: &dyn ToSql,
) -> rusqlite::Result<Option<i64>> {
  let id = conn.query_row(sql, [key], |row| row.get(0)).optional()?;
  if id.is_none() {
    debug!(sql, "key did not resolve");
  }
  Ok(id)
}
