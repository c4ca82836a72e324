//! Licenses and their tags.
//!
//! A license is stored across three normalized tables (the license row, its
//! application bridge rows, its subject/value tag rows). [`License`] is the
//! nested read model assembled from them; [`NewLicense`] is the write model,
//! which references applications and subjects by name.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  application::Application,
  subject::{Subject, normalize_name},
};

/// The value the store assigns when no accounting code is given.
pub const DEFAULT_ACCOUNTING_CODE: &str = "UNKNOWN";

// ─── Accounting code ─────────────────────────────────────────────────────────

/// The cost-center label of a license being written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountingCode {
  Assigned(String),
  /// Leave the column out of the insert and let the store fill in
  /// [`DEFAULT_ACCOUNTING_CODE`].
  #[default]
  UseDefault,
}

impl AccountingCode {
  pub fn assigned(&self) -> Option<&str> {
    match self {
      Self::Assigned(code) => Some(code),
      Self::UseDefault => None,
    }
  }
}

impl From<Option<String>> for AccountingCode {
  fn from(code: Option<String>) -> Self {
    code.map_or(Self::UseDefault, Self::Assigned)
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// Every value a license carries for one subject, next to that subject's
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  #[serde(flatten)]
  pub subject: Subject,
  pub values:  Vec<String>,
}

impl Tag {
  pub fn new(subject: Subject) -> Self {
    Self { subject, values: Vec::new() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
  pub id:              i64,
  pub expires:         NaiveDate,
  pub accounting_code: String,
  pub applications:    Vec<Application>,
  /// Keyed by subject name.
  pub tags:            BTreeMap<String, Tag>,
}

impl License {
  /// A license record holding only its own columns; applications and tags are
  /// filled in by later phases of the read.
  pub fn seed(id: i64, expires: NaiveDate, accounting_code: String) -> Self {
    Self {
      id,
      expires,
      accounting_code,
      applications: Vec::new(),
      tags: BTreeMap::new(),
    }
  }

  pub fn application_names(&self) -> impl Iterator<Item = &str> {
    self.applications.iter().map(|a| a.name.as_str())
  }
}

// ─── Write model ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::LicenseRepository::store_license`].
#[derive(Debug, Clone)]
pub struct NewLicense {
  pub expires:         NaiveDate,
  pub accounting_code: AccountingCode,
  /// Names of existing applications. At least one is required.
  pub applications:    Vec<String>,
  /// Subject name → free-form values.
  pub tags:            BTreeMap<String, Vec<String>>,
}

impl NewLicense {
  pub fn new(expires: NaiveDate) -> Self {
    Self {
      expires,
      accounting_code: AccountingCode::UseDefault,
      applications: Vec::new(),
      tags: BTreeMap::new(),
    }
  }

  pub fn with_accounting_code(mut self, code: impl Into<String>) -> Self {
    self.accounting_code = AccountingCode::Assigned(code.into());
    self
  }

  pub fn with_application(mut self, name: impl Into<String>) -> Self {
    self.applications.push(name.into());
    self
  }

  pub fn with_tag(
    mut self,
    subject: impl AsRef<str>,
    value: impl Into<String>,
  ) -> Self {
    self
      .tags
      .entry(normalize_name(subject.as_ref()))
      .or_default()
      .push(value.into());
    self
  }

  /// Lower-case tag keys (merging keys that differ only in case) and check
  /// the one-application minimum.
  pub fn normalized(mut self) -> Result<Self> {
    if self.applications.is_empty() {
      return Err(Error::NoApplications);
    }
    let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (subject, values) in std::mem::take(&mut self.tags) {
      tags.entry(normalize_name(&subject)).or_default().extend(values);
    }
    self.tags = tags;
    Ok(self)
  }

  /// `(subject, value)` pairs, one per tag row to be written.
  pub fn tag_rows(&self) -> impl Iterator<Item = (&str, &str)> {
    self.tags.iter().flat_map(|(subject, values)| {
      values.iter().map(move |v| (subject.as_str(), v.as_str()))
    })
  }
}
