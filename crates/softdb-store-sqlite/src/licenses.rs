//! [`Licenses`] — writes a license across its three tables and folds those
//! tables back into nested [`License`] records.
//!
//! A read runs in three phases:
//!
//! 1. **seed** — one record per license row, with no applications or tags;
//! 2. **applications** — the `license_application` pairs are fetched, every
//!    distinct application is resolved concurrently, and only once all of
//!    them have resolved are they appended to their licenses;
//! 3. **tags** — the `license_subject` triples are fetched; the first pass
//!    opens one bucket per (license, subject), the second appends the values.
//!
//! Each phase finishes completely before the next one starts.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use rusqlite::params;
use softdb_core::{
  Entity,
  application::Application,
  license::{License, NewLicense, Tag},
  store::{ApplicationRepository, LicenseRepository, SubjectRepository},
  subject::Subject,
};
use tracing::{debug, warn};

use crate::{
  Applications, Database, Error, Result, Subjects, database::find_id,
  encode::{RawLicense, encode_date},
};

#[derive(Clone)]
pub struct Licenses {
  db:           Database,
  applications: Applications,
  subjects:     Subjects,
}

/// Licenses in the order their ids were first seen, indexed by id.
struct Fold {
  licenses: Vec<License>,
  slots:    HashMap<i64, usize>,
}

impl Fold {
  fn seed(rows: Vec<RawLicense>) -> Result<Self> {
    let mut fold = Fold {
      licenses: Vec::with_capacity(rows.len()),
      slots:    HashMap::new(),
    };
    for row in rows {
      if fold.slots.contains_key(&row.id) {
        continue;
      }
      fold.slots.insert(row.id, fold.licenses.len());
      fold.licenses.push(row.into_seed()?);
    }
    Ok(fold)
  }

  fn get_mut(&mut self, license_id: i64) -> Option<&mut License> {
    match self.slots.get(&license_id) {
      Some(&slot) => Some(&mut self.licenses[slot]),
      None => {
        warn!(license_id, "row references a license missing from the seed");
        None
      }
    }
  }
}

/// Distinct values of `keys`, in first-seen order.
fn distinct<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
  let mut seen = HashSet::new();
  keys.into_iter().filter(|k| seen.insert(*k)).collect()
}

impl Licenses {
  pub fn new(db: Database, applications: Applications, subjects: Subjects) -> Self {
    Self { db, applications, subjects }
  }

  /// Fold every license, or only license `only`.
  async fn assemble(&self, only: Option<i64>) -> Result<Vec<License>> {
    let license_sql = format!(
      "SELECT id, expires, accounting_code FROM {}
       WHERE ?1 IS NULL OR id = ?1
       ORDER BY id",
      self.db.table("license"),
    );
    let applications_sql = format!(
      "SELECT la.license_id, a.name
       FROM {link} AS la
       JOIN {application} AS a ON la.application_id = a.id
       WHERE ?1 IS NULL OR la.license_id = ?1
       ORDER BY la.id",
      link = self.db.table("license_application"),
      application = self.db.table("application"),
    );
    let tags_sql = format!(
      "SELECT ls.license_id, s.name, ls.value
       FROM {tag} AS ls
       JOIN {subject} AS s ON ls.subject_id = s.id
       WHERE ?1 IS NULL OR ls.license_id = ?1
       ORDER BY ls.id",
      tag = self.db.table("license_subject"),
      subject = self.db.table("subject"),
    );

    // ── Phase 1: seed ──────────────────────────────────────────────────────
    let rows = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&license_sql)?;
        let rows = stmt
          .query_map([only], RawLicense::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    let mut fold = Fold::seed(rows)?;
    debug!(count = fold.licenses.len(), "seeded licenses");

    // ── Phase 2: applications ──────────────────────────────────────────────
    let pairs: Vec<(i64, String)> = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&applications_sql)?;
        let pairs = stmt
          .query_map([only], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pairs)
      })
      .await?;

    let names = distinct(pairs.iter().map(|(_, name)| name.as_str()));
    // Barrier: every application resolves before any is attached.
    let applications = try_join_all(
      names.iter().map(|name| self.applications.get_application_by_name(name)),
    )
    .await?;
    let resolved: HashMap<&str, Application> =
      names.iter().copied().zip(applications).collect();

    for (license_id, name) in &pairs {
      if let (Some(license), Some(application)) =
        (fold.get_mut(*license_id), resolved.get(name.as_str()))
      {
        license.applications.push(application.clone());
      }
    }
    debug!(links = pairs.len(), distinct = resolved.len(), "folded applications");

    // ── Phase 3: tags ──────────────────────────────────────────────────────
    let triples: Vec<(i64, String, String)> = self
      .db
      .call(move |conn| {
        let mut stmt = conn.prepare(&tags_sql)?;
        let triples = stmt
          .query_map([only], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(triples)
      })
      .await?;

    let names = distinct(triples.iter().map(|(_, name, _)| name.as_str()));
    // Barrier: every subject resolves before any bucket is opened.
    let resolved_subjects = try_join_all(
      names.iter().map(|name| self.subjects.get_subject_by_name(name)),
    )
    .await?;
    let subjects: HashMap<&str, Subject> =
      names.iter().copied().zip(resolved_subjects).collect();

    // Pass one opens every bucket, for every row, before pass two appends
    // a single value.
    for (license_id, name, _) in &triples {
      if let (Some(license), Some(subject)) =
        (fold.get_mut(*license_id), subjects.get(name.as_str()))
      {
        license
          .tags
          .entry(name.clone())
          .or_insert_with(|| Tag::new(subject.clone()));
      }
    }
    for (license_id, name, value) in triples {
      if let Some(tag) = fold
        .get_mut(license_id)
        .and_then(|license| license.tags.get_mut(&name))
      {
        tag.values.push(value);
      }
    }

    Ok(fold.licenses)
  }
}

// ─── LicenseRepository impl ──────────────────────────────────────────────────

impl LicenseRepository for Licenses {
  type Error = Error;

  async fn store_license(&self, license: NewLicense) -> Result<License> {
    let license = license.normalized()?;

    // The column list omits accounting_code when unassigned so the column
    // default applies.
    let insert_license = match license.accounting_code.assigned() {
      Some(_) => format!(
        "INSERT INTO {} (expires, accounting_code) VALUES (?1, ?2)",
        self.db.table("license"),
      ),
      None => format!("INSERT INTO {} (expires) VALUES (?1)", self.db.table("license")),
    };
    let select_application_id = format!(
      "SELECT id FROM {} WHERE name = ?1",
      self.db.table("application"),
    );
    let insert_link = format!(
      "INSERT INTO {} (license_id, application_id) VALUES (?1, ?2)",
      self.db.table("license_application"),
    );
    let select_subject_id =
      format!("SELECT id FROM {} WHERE name = ?1", self.db.table("subject"));
    let insert_tag = format!(
      "INSERT INTO {} (license_id, subject_id, value) VALUES (?1, ?2, ?3)",
      self.db.table("license_subject"),
    );

    // One transaction: a failing link or tag leaves no trace of the license.
    let id = self
      .db
      .call(move |conn| {
        let tx = conn.transaction()?;
        let expires = encode_date(license.expires);
        match license.accounting_code.assigned() {
          Some(code) => tx.execute(&insert_license, params![expires, code])?,
          None => tx.execute(&insert_license, params![expires])?,
        };
        let license_id = tx.last_insert_rowid();

        for name in &license.applications {
          let Some(application_id) = find_id(&tx, &select_application_id, name)?
          else {
            return Ok(Err(Error::unknown_reference(Entity::Application, name)));
          };
          tx.execute(&insert_link, params![license_id, application_id])?;
        }

        for (subject, value) in license.tag_rows() {
          let Some(subject_id) = find_id(&tx, &select_subject_id, &subject)? else {
            return Ok(Err(Error::unknown_reference(Entity::Subject, subject)));
          };
          tx.execute(&insert_tag, params![license_id, subject_id, value])?;
        }

        tx.commit()?;
        Ok(Ok(license_id))
      })
      .await??;

    debug!(id, "stored license");
    self.get_license(id).await
  }

  async fn add_application_to_license(
    &self,
    application_name: &str,
    license_id: i64,
  ) -> Result<()> {
    let select_license_id =
      format!("SELECT id FROM {} WHERE id = ?1", self.db.table("license"));
    let select_application_id = format!(
      "SELECT id FROM {} WHERE name = ?1",
      self.db.table("application"),
    );
    let insert_link = format!(
      "INSERT INTO {} (license_id, application_id) VALUES (?1, ?2)",
      self.db.table("license_application"),
    );
    let application = application_name.to_owned();

    self
      .db
      .call(move |conn| {
        if find_id(conn, &select_license_id, &license_id)?.is_none() {
          return Ok(Err(Error::unknown_reference(Entity::License, license_id)));
        }
        let Some(application_id) =
          find_id(conn, &select_application_id, &application)?
        else {
          return Ok(Err(Error::unknown_reference(Entity::Application, application)));
        };
        conn.execute(&insert_link, params![license_id, application_id])?;
        Ok(Ok(()))
      })
      .await?
  }

  async fn get_license(&self, id: i64) -> Result<License> {
    self
      .assemble(Some(id))
      .await?
      .pop()
      .ok_or_else(|| Error::not_found(Entity::License, id))
  }

  async fn get_all_licenses(&self) -> Result<Vec<License>> {
    self.assemble(None).await
  }
}
