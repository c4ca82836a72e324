//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 `YYYY-MM-DD` strings; enums as their lower
//! case names.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use softdb_core::{
  application::{Application, ApplicationType},
  license::License,
  room::Room,
  subject::{Category, Subject},
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String {
  date.format(DATE_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("bad date {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_category(s: &str) -> Result<Category> {
  Category::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

pub fn decode_application_type(s: &str) -> Result<ApplicationType> {
  ApplicationType::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of a `subject` row.
pub struct RawSubject {
  pub id:          i64,
  pub category:    String,
  pub name:        String,
  pub description: String,
}

impl RawSubject {
  pub const COLUMNS: &'static str = "id, category, name, description";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      category:    row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
    })
  }

  pub fn into_subject(self, parents: BTreeSet<String>) -> Result<Subject> {
    Ok(Subject {
      id: self.id,
      category: decode_category(&self.category)?,
      name: self.name,
      description: self.description,
      parents,
    })
  }
}

/// Raw columns of an `application` row.
pub struct RawApplication {
  pub id:   i64,
  pub name: String,
  pub kind: String,
}

impl RawApplication {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, name: row.get(1)?, kind: row.get(2)? })
  }

  pub fn into_application(self, rooms: Vec<Room>) -> Result<Application> {
    Ok(Application {
      id: self.id,
      name: self.name,
      kind: decode_application_type(&self.kind)?,
      rooms,
    })
  }
}

/// Raw columns of a `license` row.
pub struct RawLicense {
  pub id:              i64,
  pub expires:         String,
  pub accounting_code: String,
}

impl RawLicense {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      expires:         row.get(1)?,
      accounting_code: row.get(2)?,
    })
  }

  /// A license with its own columns decoded and no applications or tags yet.
  pub fn into_seed(self) -> Result<License> {
    Ok(License::seed(self.id, decode_date(&self.expires)?, self.accounting_code))
  }
}
