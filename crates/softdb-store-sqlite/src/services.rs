//! [`Services`] — the repositories of one database, wired together.

use std::path::Path;

use softdb_core::store::Catalog;

use crate::{Applications, Database, Licenses, Result, Rooms, Subjects};

/// Every repository over one [`Database`], each holding the collaborators it
/// was constructed with.
///
/// Cloning is cheap. All repositories share the same connection.
#[derive(Clone)]
pub struct Services {
  pub subjects:     Subjects,
  pub rooms:        Rooms,
  pub applications: Applications,
  pub licenses:     Licenses,
}

impl Services {
  pub fn new(db: &Database) -> Self {
    let subjects = Subjects::new(db.clone());
    let rooms = Rooms::new(db.clone());
    let applications = Applications::new(db.clone(), rooms.clone());
    let licenses = Licenses::new(db.clone(), applications.clone(), subjects.clone());
    Self { subjects, rooms, applications, licenses }
  }

  /// Open (or create) the database at `path`, set up its schema, and wire the
  /// repositories.
  pub async fn open(path: impl AsRef<Path>, table_prefix: &str) -> Result<Self> {
    let db = Database::open(path, table_prefix).await?;
    db.setup().await?;
    Ok(Self::new(&db))
  }

  /// Same as [`Services::open`] over an in-memory database, useful for
  /// testing.
  pub async fn open_in_memory() -> Result<Self> {
    let db = Database::open_in_memory("").await?;
    db.setup().await?;
    Ok(Self::new(&db))
  }
}

impl Catalog for Services {
  type Subjects = Subjects;
  type Rooms = Rooms;
  type Applications = Applications;
  type Licenses = Licenses;

  fn subjects(&self) -> &Subjects { &self.subjects }

  fn rooms(&self) -> &Rooms { &self.rooms }

  fn applications(&self) -> &Applications { &self.applications }

  fn licenses(&self) -> &Licenses { &self.licenses }
}
