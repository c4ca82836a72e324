//! [`Applications`] — applications and their room links.
//!
//! Reading an application is the license fold in miniature: its own columns,
//! then the addresses linked through `application_room`, then each room
//! resolved through the injected [`Rooms`] repository.

use futures::future::try_join_all;
use rusqlite::{OptionalExtension as _, params};
use softdb_core::{
  Entity,
  application::{Application, NewApplication},
  store::{ApplicationRepository, RoomRepository},
};
use tracing::debug;

use crate::{
  Database, Error, Result, Rooms, database::find_id, encode::RawApplication,
};

#[derive(Clone)]
pub struct Applications {
  db:    Database,
  rooms: Rooms,
}

impl Applications {
  pub fn new(db: Database, rooms: Rooms) -> Self { Self { db, rooms } }

  fn select_room_id(&self) -> String {
    format!("SELECT id FROM {} WHERE address = ?1", self.db.table("room"))
  }

  fn insert_link(&self) -> String {
    format!(
      "INSERT INTO {} (application_id, room_id) VALUES (?1, ?2)",
      self.db.table("application_room"),
    )
  }
}

impl ApplicationRepository for Applications {
  type Error = Error;

  async fn store_application(
    &self,
    application: NewApplication,
  ) -> Result<Application> {
    application.validate()?;
    let NewApplication { name, kind, rooms } = application;

    let insert_application = format!(
      "INSERT INTO {} (name, type) VALUES (?1, ?2)",
      self.db.table("application"),
    );
    let select_room_id = self.select_room_id();
    let insert_link = self.insert_link();

    let key = name.clone();
    self
      .db
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&insert_application, params![name, kind.to_string()])?;
        let application_id = tx.last_insert_rowid();

        for address in &rooms {
          let Some(room_id) = find_id(&tx, &select_room_id, address)? else {
            return Ok(Err(Error::unknown_reference(Entity::Room, address)));
          };
          tx.execute(&insert_link, params![application_id, room_id])?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    debug!(name = %key, "stored application");
    self.get_application_by_name(&key).await
  }

  async fn add_application_to_room(
    &self,
    application_name: &str,
    room_address: &str,
  ) -> Result<()> {
    let select_application_id = format!(
      "SELECT id FROM {} WHERE name = ?1",
      self.db.table("application"),
    );
    let select_room_id = self.select_room_id();
    let insert_link = self.insert_link();
    let application = application_name.to_owned();
    let address = room_address.to_owned();

    self
      .db
      .call(move |conn| {
        let Some(application_id) =
          find_id(conn, &select_application_id, &application)?
        else {
          return Ok(Err(Error::unknown_reference(Entity::Application, application)));
        };
        let Some(room_id) = find_id(conn, &select_room_id, &address)? else {
          return Ok(Err(Error::unknown_reference(Entity::Room, address)));
        };
        conn.execute(&insert_link, params![application_id, room_id])?;
        Ok(Ok(()))
      })
      .await?
  }

  async fn get_application_by_name(&self, name: &str) -> Result<Application> {
    let own_sql = format!(
      "SELECT id, name, type FROM {} WHERE name = ?1",
      self.db.table("application"),
    );
    let rooms_sql = format!(
      "SELECT r.address
       FROM {room} AS r
       JOIN {link} AS ar ON ar.room_id = r.id
       WHERE ar.application_id = ?1
       ORDER BY ar.id",
      room = self.db.table("room"),
      link = self.db.table("application_room"),
    );
    let key = name.to_owned();

    let found = self
      .db
      .call(move |conn| {
        let Some(raw) = conn
          .query_row(&own_sql, [key], RawApplication::from_row)
          .optional()?
        else {
          return Ok(None);
        };
        let mut stmt = conn.prepare(&rooms_sql)?;
        let addresses = stmt
          .query_map([raw.id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(Some((raw, addresses)))
      })
      .await?;

    let Some((raw, addresses)) = found else {
      return Err(Error::not_found(Entity::Application, name));
    };

    let rooms = try_join_all(
      addresses
        .iter()
        .map(|address| self.rooms.get_room_by_address(address)),
    )
    .await?;

    raw.into_application(rooms)
  }

  async fn get_all_applications(&self) -> Result<Vec<Application>> {
    let names = self.get_all_application_names().await?;
    try_join_all(names.iter().map(|name| self.get_application_by_name(name))).await
  }

  async fn get_all_application_names(&self) -> Result<Vec<String>> {
    let sql = format!(
      "SELECT name FROM {} ORDER BY id",
      self.db.table("application"),
    );
    self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let names = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
      })
      .await
  }
}
