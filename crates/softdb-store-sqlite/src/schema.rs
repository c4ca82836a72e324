//! SQL schema for the SoftDB SQLite store.
//!
//! Every table name carries the deployment's table prefix, so several
//! deployments can share one database file. The DDL is idempotent thanks to
//! `CREATE … IF NOT EXISTS`.

use softdb_core::subject::Category;
use strum::IntoEnumIterator as _;

/// Connection-level settings; must run on every connection that is opened.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL for the tables named with prefix `p`.
pub fn ddl(p: &str) -> String {
  format!(
    "
CREATE TABLE IF NOT EXISTS {p}subject (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category    TEXT NOT NULL,
    name        TEXT NOT NULL COLLATE NOCASE,
    description TEXT NOT NULL DEFAULT '',
    CONSTRAINT {p}subject_category_ck CHECK (category IN ('who', 'what', 'when', 'where', 'why')),
    CONSTRAINT {p}subject_name_uk UNIQUE (name)
);

-- Directed parent -> child edges. Cycles between distinct subjects are allowed.
CREATE TABLE IF NOT EXISTS {p}subject_child (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER NOT NULL REFERENCES {p}subject (id) ON DELETE CASCADE,
    child_id  INTEGER NOT NULL REFERENCES {p}subject (id) ON DELETE CASCADE,
    CONSTRAINT {p}subject_child_parent_id_child_id_uk UNIQUE (parent_id, child_id),
    CONSTRAINT {p}subject_child_parent_id_child_id_ck CHECK (parent_id != child_id)
);

CREATE TABLE IF NOT EXISTS {p}application (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    CONSTRAINT {p}application_name_uk UNIQUE (name),
    CONSTRAINT {p}application_type_ck CHECK (type IN ('application', 'desktop', 'web'))
);

CREATE TABLE IF NOT EXISTS {p}room (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL,
    CONSTRAINT {p}room_address_uk UNIQUE (address)
);

CREATE TABLE IF NOT EXISTS {p}license (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    expires         TEXT NOT NULL,   -- ISO 8601 date
    accounting_code TEXT NOT NULL DEFAULT 'UNKNOWN'
);

CREATE TABLE IF NOT EXISTS {p}license_application (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    license_id     INTEGER NOT NULL REFERENCES {p}license (id) ON DELETE CASCADE,
    application_id INTEGER NOT NULL REFERENCES {p}application (id) ON DELETE CASCADE,
    CONSTRAINT {p}license_application_license_id_application_id_uk UNIQUE (license_id, application_id)
);

-- Tag values: free-form strings keyed by subject.
CREATE TABLE IF NOT EXISTS {p}license_subject (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    license_id INTEGER NOT NULL REFERENCES {p}license (id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES {p}subject (id) ON DELETE CASCADE,
    value      TEXT NOT NULL,
    CONSTRAINT {p}license_subject_uk UNIQUE (license_id, subject_id, value)
);

CREATE TABLE IF NOT EXISTS {p}application_room (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    application_id INTEGER NOT NULL REFERENCES {p}application (id) ON DELETE CASCADE,
    room_id        INTEGER NOT NULL REFERENCES {p}room (id) ON DELETE CASCADE,
    CONSTRAINT {p}application_room_uk UNIQUE (application_id, room_id)
);

CREATE INDEX IF NOT EXISTS {p}subject_name_idx                     ON {p}subject (name);
CREATE INDEX IF NOT EXISTS {p}subject_child_parent_id_idx          ON {p}subject_child (parent_id);
CREATE INDEX IF NOT EXISTS {p}subject_child_child_id_idx           ON {p}subject_child (child_id);
CREATE INDEX IF NOT EXISTS {p}license_expires_idx                  ON {p}license (expires);
CREATE INDEX IF NOT EXISTS {p}license_application_license_id_idx   ON {p}license_application (license_id);
CREATE INDEX IF NOT EXISTS {p}license_application_application_id_idx ON {p}license_application (application_id);
CREATE INDEX IF NOT EXISTS {p}license_subject_license_id_idx       ON {p}license_subject (license_id);
CREATE INDEX IF NOT EXISTS {p}license_subject_subject_id_idx       ON {p}license_subject (subject_id);
CREATE INDEX IF NOT EXISTS {p}application_room_application_id_idx  ON {p}application_room (application_id);
CREATE INDEX IF NOT EXISTS {p}application_room_room_id_idx         ON {p}application_room (room_id);
"
  )
}

/// One root subject per category, named after it. Existing rows are left
/// alone.
pub fn seed_roots(p: &str) -> String {
  let values = Category::iter()
    .map(|c| format!("('{c}', '{c}', '{}')", c.root_description()))
    .collect::<Vec<_>>()
    .join(",\n    ");
  format!(
    "INSERT OR IGNORE INTO {p}subject (category, name, description) VALUES\n    {values};"
  )
}

/// Whether `prefix` is safe to splice into unquoted identifiers: ASCII
/// letters, digits and `_`, not starting with a digit.
pub fn is_valid_prefix(prefix: &str) -> bool {
  !prefix.starts_with(|c: char| c.is_ascii_digit())
    && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ddl_prefixes_every_table() {
    let sql = ddl("sdb_");
    for table in [
      "subject",
      "subject_child",
      "application",
      "room",
      "license",
      "license_application",
      "license_subject",
      "application_room",
    ] {
      assert!(
        sql.contains(&format!("CREATE TABLE IF NOT EXISTS sdb_{table} (")),
        "missing {table}"
      );
    }
    assert!(!sql.contains("REFERENCES subject "));
  }

  #[test]
  fn seed_covers_every_category() {
    let sql = seed_roots("");
    assert!(sql.starts_with("INSERT OR IGNORE INTO subject"));
    assert!(sql.contains("('who', 'who', 'a person')"));
    assert!(sql.contains("('why', 'why', 'a purpose')"));
  }

  #[test]
  fn prefix_validation() {
    assert!(is_valid_prefix(""));
    assert!(is_valid_prefix("lab_2_"));
    assert!(is_valid_prefix("_1"));
    assert!(!is_valid_prefix("1_"));
    assert!(!is_valid_prefix("x; DROP TABLE license; --"));
  }
}
