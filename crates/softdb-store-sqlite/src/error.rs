//! Error type for `softdb-store-sqlite`.

use rusqlite::ffi;
use softdb_core::{Classify, Entity, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] softdb_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("{entity} not found: {key}")]
  NotFound { entity: Entity, key: String },

  /// An insert named a row that does not exist.
  #[error("referenced {entity} not found: {key}")]
  UnknownReference { entity: Entity, key: String },

  #[error("invalid table prefix {0:?}: only ASCII letters, digits and '_' are allowed")]
  InvalidPrefix(String),
}

impl Error {
  pub(crate) fn not_found(entity: Entity, key: impl ToString) -> Self {
    Self::NotFound { entity, key: key.to_string() }
  }

  pub(crate) fn unknown_reference(entity: Entity, key: impl ToString) -> Self {
    Self::UnknownReference { entity, key: key.to_string() }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Self::Database(tokio_rusqlite::Error::Rusqlite(e))
  }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => classify_sqlite(e),
      Error::Database(_) | Error::Decode(_) => ErrorKind::Connectivity,
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::UnknownReference { .. } => ErrorKind::ForeignKeyViolation,
      Error::InvalidPrefix(_) => ErrorKind::Validation,
    }
  }
}

/// Map SQLite's extended constraint codes onto the failure taxonomy.
fn classify_sqlite(err: &rusqlite::Error) -> ErrorKind {
  match err {
    rusqlite::Error::SqliteFailure(code, _)
      if code.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      match code.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
          ErrorKind::DuplicateKey
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY | ffi::SQLITE_CONSTRAINT_NOTNULL => {
          ErrorKind::ForeignKeyViolation
        }
        _ => ErrorKind::Validation,
      }
    }
    rusqlite::Error::QueryReturnedNoRows => ErrorKind::NotFound,
    _ => ErrorKind::Connectivity,
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
