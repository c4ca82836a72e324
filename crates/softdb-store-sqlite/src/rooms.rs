//! [`Rooms`] — keyed store for rooms.

use rusqlite::OptionalExtension as _;
use softdb_core::{
  Entity,
  room::{NewRoom, Room},
  store::RoomRepository,
};
use tracing::debug;

use crate::{Database, Error, Result};

#[derive(Clone)]
pub struct Rooms {
  db: Database,
}

impl Rooms {
  pub fn new(db: Database) -> Self { Self { db } }
}

fn room_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
  Ok(Room { id: row.get(0)?, address: row.get(1)? })
}

impl RoomRepository for Rooms {
  type Error = Error;

  async fn store_room(&self, room: NewRoom) -> Result<Room> {
    if room.address.trim().is_empty() {
      return Err(softdb_core::Error::EmptyName(Entity::Room).into());
    }
    let sql = format!("INSERT INTO {} (address) VALUES (?1)", self.db.table("room"));
    let address = room.address.clone();

    let id = self
      .db
      .call(move |conn| {
        conn.execute(&sql, [&address])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    debug!(id, address = %room.address, "stored room");
    Ok(Room { id, address: room.address })
  }

  async fn get_room_by_address(&self, address: &str) -> Result<Room> {
    let sql = format!(
      "SELECT id, address FROM {} WHERE address = ?1",
      self.db.table("room"),
    );
    let key = address.to_owned();

    self
      .db
      .call(move |conn| Ok(conn.query_row(&sql, [key], room_from_row).optional()?))
      .await?
      .ok_or_else(|| Error::not_found(Entity::Room, address))
  }

  async fn get_all_rooms(&self) -> Result<Vec<Room>> {
    let sql = format!("SELECT id, address FROM {} ORDER BY id", self.db.table("room"));
    self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rooms = stmt
          .query_map([], room_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rooms)
      })
      .await
  }
}
