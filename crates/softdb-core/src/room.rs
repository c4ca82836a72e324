//! Rooms — the physical places (labs, machines) applications are installed in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
  pub id:      i64,
  pub address: String,
}

/// Input to [`crate::store::RoomRepository::store_room`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewRoom {
  pub address: String,
}

impl NewRoom {
  pub fn new(address: impl Into<String>) -> Self {
    Self { address: address.into() }
  }
}
