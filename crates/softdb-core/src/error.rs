//! Error types for `softdb-core`.
//!
//! Besides the validation failures raised by the domain types themselves, this
//! module defines the failure taxonomy ([`ErrorKind`]) every repository backend
//! reports through [`Classify`], so callers can branch on the condition
//! without knowing which backend produced it.

use serde::Serialize;
use thiserror::Error;

/// The entity a lookup or reference was made against.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Entity {
  Subject,
  Room,
  Application,
  License,
}

/// Backend-independent classification of a failed repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// A lookup by unique key matched no row.
  NotFound,
  /// An insert collided with a uniqueness constraint.
  DuplicateKey,
  /// An insert referenced a name or id that does not resolve to a row.
  ForeignKeyViolation,
  /// The input was rejected before (or instead of) reaching the store.
  Validation,
  /// The store was unreachable, or returned something we could not use.
  Connectivity,
}

/// Implemented by every error type a repository may return.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("license must contain at least one application")]
  NoApplications,

  #[error("subject {0:?} cannot be its own parent")]
  SelfParent(String),

  #[error("{0} name must not be empty")]
  EmptyName(Entity),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown application type: {0:?}")]
  UnknownApplicationType(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind { ErrorKind::Validation }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
