//! [`Subjects`] — the subject hierarchy repository.
//!
//! Closures are computed in memory: the subject names and the whole edge table
//! are read in one round trip into a [`SubjectGraph`], which is then walked.

use std::collections::{BTreeSet, HashMap};

use futures::future::try_join_all;
use rusqlite::{OptionalExtension as _, params};
use softdb_core::{
  Entity,
  hierarchy::SubjectGraph,
  store::SubjectRepository,
  subject::{NewSubject, Subject, normalize_name},
};
use tracing::debug;

use crate::{Database, Error, Result, database::find_id, encode::RawSubject};

/// The subject table reduced to id → name, plus every edge.
struct Taxonomy {
  names: HashMap<i64, String>,
  graph: SubjectGraph,
}

impl Taxonomy {
  fn names_of(&self, ids: impl IntoIterator<Item = i64>) -> Vec<String> {
    ids
      .into_iter()
      .filter_map(|id| self.names.get(&id).cloned())
      .collect()
  }
}

#[derive(Clone)]
pub struct Subjects {
  db: Database,
}

impl Subjects {
  pub fn new(db: Database) -> Self { Self { db } }

  async fn find(&self, name: String) -> Result<Option<RawSubject>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE name = ?1",
      RawSubject::COLUMNS,
      self.db.table("subject"),
    );
    self
      .db
      .call(move |conn| {
        Ok(conn.query_row(&sql, [name], RawSubject::from_row).optional()?)
      })
      .await
  }

  async fn taxonomy(&self) -> Result<Taxonomy> {
    let names_sql = format!("SELECT id, name FROM {}", self.db.table("subject"));
    let edges_sql = format!(
      "SELECT parent_id, child_id FROM {} ORDER BY id",
      self.db.table("subject_child"),
    );

    let (names, edges) = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&names_sql)?;
        let names = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<HashMap<i64, String>>>()?;

        let mut stmt = conn.prepare(&edges_sql)?;
        let edges = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<(i64, i64)>>>()?;

        Ok((names, edges))
      })
      .await?;

    Ok(Taxonomy { names, graph: SubjectGraph::from_edges(edges) })
  }

  async fn get_all_subject_names(&self) -> Result<Vec<String>> {
    let sql = format!("SELECT name FROM {} ORDER BY id", self.db.table("subject"));
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

// ─── SubjectRepository impl ──────────────────────────────────────────────────

impl SubjectRepository for Subjects {
  type Error = Error;

  async fn store_subject(&self, subject: NewSubject) -> Result<Subject> {
    let NewSubject { category, name, description, parents } =
      subject.normalized()?;

    let insert_subject = format!(
      "INSERT INTO {} (category, name, description) VALUES (?1, ?2, ?3)",
      self.db.table("subject"),
    );
    let select_id =
      format!("SELECT id FROM {} WHERE name = ?1", self.db.table("subject"));
    let insert_edge = format!(
      "INSERT INTO {} (parent_id, child_id) VALUES (?1, ?2)",
      self.db.table("subject_child"),
    );

    let key = name.clone();
    self
      .db
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          &insert_subject,
          params![category.to_string(), name, description],
        )?;
        let child_id = tx.last_insert_rowid();

        for parent in &parents {
          let Some(parent_id) = find_id(&tx, &select_id, parent)? else {
            return Ok(Err(Error::unknown_reference(Entity::Subject, parent)));
          };
          tx.execute(&insert_edge, params![parent_id, child_id])?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    debug!(name = %key, "stored subject");
    self.get_subject_by_name(&key).await
  }

  async fn get_subject_by_name(&self, name: &str) -> Result<Subject> {
    let name = normalize_name(name);
    let raw = self
      .find(name.clone())
      .await?
      .ok_or_else(|| Error::not_found(Entity::Subject, &name))?;

    let taxonomy = self.taxonomy().await?;
    let parents: BTreeSet<String> =
      taxonomy.names_of(taxonomy.graph.ancestors(raw.id)).into_iter().collect();

    raw.into_subject(parents)
  }

  async fn get_all_subjects(&self) -> Result<Vec<Subject>> {
    let names = self.get_all_subject_names().await?;
    // Each closure is computed independently; all lookups run concurrently.
    try_join_all(names.iter().map(|name| self.get_subject_by_name(name))).await
  }

  async fn add_child(&self, parent_name: &str, child_name: &str) -> Result<()> {
    let parent = normalize_name(parent_name);
    let child = normalize_name(child_name);
    if parent == child {
      return Err(softdb_core::Error::SelfParent(child).into());
    }

    let select_id =
      format!("SELECT id FROM {} WHERE name = ?1", self.db.table("subject"));
    let insert_edge = format!(
      "INSERT INTO {} (parent_id, child_id) VALUES (?1, ?2)",
      self.db.table("subject_child"),
    );

    self
      .db
      .call(move |conn| {
        let Some(parent_id) = find_id(conn, &select_id, &parent)? else {
          return Ok(Err(Error::unknown_reference(Entity::Subject, parent)));
        };
        let Some(child_id) = find_id(conn, &select_id, &child)? else {
          return Ok(Err(Error::unknown_reference(Entity::Subject, child)));
        };
        conn.execute(&insert_edge, params![parent_id, child_id])?;
        debug!(%parent, %child, "added subject edge");
        Ok(Ok(()))
      })
      .await?
  }

  async fn get_all_descendant_subjects(
    &self,
    root_name: &str,
  ) -> Result<Vec<Subject>> {
    let root_name = normalize_name(root_name);
    let root = self
      .find(root_name.clone())
      .await?
      .ok_or_else(|| Error::not_found(Entity::Subject, &root_name))?;

    let taxonomy = self.taxonomy().await?;
    let names = taxonomy.names_of(taxonomy.graph.descendants(root.id));
    debug!(root = %root_name, count = names.len(), "resolved descendants");

    try_join_all(names.iter().map(|name| self.get_subject_by_name(name))).await
  }
}
