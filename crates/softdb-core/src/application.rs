//! Applications — the software a license covers.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, error::Entity, room::Room};

/// How an application is delivered. Stored lower case.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApplicationType {
  Application,
  Desktop,
  Web,
}

impl ApplicationType {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownApplicationType(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  pub id:    i64,
  pub name:  String,
  #[serde(rename = "type")]
  pub kind:  ApplicationType,
  /// Rooms in the order they were linked.
  pub rooms: Vec<Room>,
}

/// Input to [`crate::store::ApplicationRepository::store_application`].
#[derive(Debug, Clone)]
pub struct NewApplication {
  pub name:  String,
  pub kind:  ApplicationType,
  /// Addresses of existing rooms to link the application to.
  pub rooms: Vec<String>,
}

impl NewApplication {
  pub fn new(name: impl Into<String>, kind: ApplicationType) -> Self {
    Self { name: name.into(), kind, rooms: Vec::new() }
  }

  pub fn in_room(mut self, address: impl Into<String>) -> Self {
    self.rooms.push(address.into());
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName(Entity::Application));
    }
    Ok(())
  }
}
