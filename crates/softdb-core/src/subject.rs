//! Subjects — the nodes of the who/what/when/where/why tag taxonomy.
//!
//! Subjects form a directed graph through parent → child edges. The graph is
//! usually a DAG, but two subjects acting as aliases may parent each other, so
//! every traversal must tolerate cycles (see [`crate::hierarchy`]).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, error::Entity};

/// The axis a subject annotates a license along.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
  Who,
  What,
  When,
  Where,
  Why,
}

impl Category {
  /// Parse a stored or user-supplied category, ignoring case.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownCategory(s.to_owned()))
  }

  /// Description of the root subject seeded for this category. Each category
  /// has one root subject carrying the category's own name.
  pub fn root_description(self) -> &'static str {
    match self {
      Self::Who => "a person",
      Self::What => "a thing",
      Self::When => "a time",
      Self::Where => "a place",
      Self::Why => "a purpose",
    }
  }
}

/// Subject names are unique without regard to case; they are always stored
/// and compared in lower case.
pub fn normalize_name(name: &str) -> String { name.to_lowercase() }

/// A taxonomy node as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:          i64,
  pub category:    Category,
  pub name:        String,
  pub description: String,
  /// The subject's own name plus every ancestor reachable through parent
  /// edges, not only the immediate parents.
  pub parents:     BTreeSet<String>,
}

/// Input to [`crate::store::SubjectRepository::store_subject`].
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub category:    Category,
  pub name:        String,
  pub description: String,
  /// Names of existing subjects that become immediate parents.
  pub parents:     Vec<String>,
}

impl NewSubject {
  pub fn new(
    category: Category,
    name: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      category,
      name: normalize_name(&name.into()),
      description: description.into(),
      parents: Vec::new(),
    }
  }

  pub fn with_parent(mut self, parent: impl AsRef<str>) -> Self {
    self.parents.push(normalize_name(parent.as_ref()));
    self
  }

  /// Lower-case every name and reject inputs the schema would refuse anyway.
  pub fn normalized(mut self) -> Result<Self> {
    self.name = normalize_name(&self.name);
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName(Entity::Subject));
    }
    for parent in &mut self.parents {
      *parent = normalize_name(parent);
      if *parent == self.name {
        return Err(Error::SelfParent(self.name.clone()));
      }
    }
    let mut seen = BTreeSet::new();
    self.parents.retain(|p| seen.insert(p.clone()));
    Ok(self)
  }
}
