//! Structure synchronizer: makes the rows declared by a template exist.
//!
//! Each step looks a row up first and inserts only when it is missing. An
//! insert rejected by a uniqueness constraint means another writer created
//! the row in between; the existing row is re-read and the sync continues.

use std::collections::HashSet;

use aas_core::{
  Template,
  shell::{NewAsset, ValueType},
  store::StructureReport,
  template::semantic_id,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{encode_dt, encode_uuid},
};

/// Run the whole synchronization in one immediate transaction.
pub fn ensure_structure(
  conn: &mut Connection,
  asset: &NewAsset,
  template: &Template,
  now: DateTime<Utc>,
) -> Result<StructureReport> {
  let now = encode_dt(now);
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let mut report = StructureReport {
    asset_created: ensure_asset(&tx, asset, &now)?,
    ..StructureReport::default()
  };

  for sm in template {
    let (submodel_id, created) = ensure_submodel(&tx, &asset.asset_id, &sm.title, &now)?;
    if created {
      report.submodels_created += 1;
    }

    let existing = element_keys(&tx, &submodel_id)?;
    for key in sm.keys.iter().filter(|k| !existing.contains(k.as_str())) {
      if insert_element(&tx, &submodel_id, key, &now)? {
        report.elements_created += 1;
      }
    }
  }

  tx.commit()?;
  Ok(report)
}

/// `SQLITE_CONSTRAINT_UNIQUE` or `SQLITE_CONSTRAINT_PRIMARYKEY`.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

// ─── Asset ───────────────────────────────────────────────────────────────────

fn ensure_asset(conn: &Connection, asset: &NewAsset, now: &str) -> Result<bool> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM asset WHERE id = ?1",
      params![asset.asset_id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if exists {
    return Ok(false);
  }

  match conn.execute(
    "INSERT INTO asset (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
    params![asset.asset_id, asset.name, asset.description, now],
  ) {
    Ok(_) => Ok(true),
    Err(e) if is_unique_violation(&e) => {
      debug!(asset_id = %asset.asset_id, "asset created concurrently; keeping existing row");
      Ok(false)
    }
    Err(e) => Err(e.into()),
  }
}

// ─── Submodel ────────────────────────────────────────────────────────────────

/// The id of the asset's submodel titled `title`, if it exists.
pub fn submodel_id(conn: &Connection, asset_id: &str, title: &str) -> Result<Option<String>> {
  Ok(
    conn
      .query_row(
        "SELECT id FROM submodel WHERE asset_id = ?1 AND title = ?2",
        params![asset_id, title],
        |r| r.get(0),
      )
      .optional()?,
  )
}

fn ensure_submodel(
  conn: &Connection,
  asset_id: &str,
  title: &str,
  now: &str,
) -> Result<(String, bool)> {
  match submodel_id(conn, asset_id, title)? {
    Some(id) => Ok((id, false)),
    None => insert_submodel(conn, asset_id, title, now),
  }
}

/// Insert a submodel, falling back to the existing row if `(asset_id, title)`
/// is already taken. Returns the id and whether a row was created.
pub fn insert_submodel(
  conn: &Connection,
  asset_id: &str,
  title: &str,
  now: &str,
) -> Result<(String, bool)> {
  let id = encode_uuid(Uuid::new_v4());
  match conn.execute(
    "INSERT INTO submodel (id, asset_id, title, semantic_id, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![id, asset_id, title, semantic_id(title), now],
  ) {
    Ok(_) => Ok((id, true)),
    Err(e) if is_unique_violation(&e) => {
      debug!(asset_id, title, "submodel created concurrently; reusing existing row");
      submodel_id(conn, asset_id, title)?
        .map(|existing| (existing, false))
        .ok_or(Error::Sqlite(e))
    }
    Err(e) => Err(e.into()),
  }
}

// ─── Elements ────────────────────────────────────────────────────────────────

fn element_keys(conn: &Connection, submodel_id: &str) -> Result<HashSet<String>> {
  let mut stmt = conn.prepare("SELECT key FROM submodel_element WHERE submodel_id = ?1")?;
  let keys = stmt
    .query_map(params![submodel_id], |r| r.get(0))?
    .collect::<rusqlite::Result<HashSet<String>>>()?;
  Ok(keys)
}

/// Insert an element with no value yet. Returns `false` if `(submodel_id,
/// key)` already existed.
pub fn insert_element(conn: &Connection, submodel_id: &str, key: &str, now: &str) -> Result<bool> {
  match conn.execute(
    "INSERT INTO submodel_element (id, submodel_id, key, value, value_type, created_at)
     VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
    params![
      encode_uuid(Uuid::new_v4()),
      submodel_id,
      key,
      ValueType::String.as_str(),
      now
    ],
  ) {
    Ok(_) => Ok(true),
    Err(e) if is_unique_violation(&e) => {
      debug!(submodel_id, key, "element created concurrently; keeping existing row");
      Ok(false)
    }
    Err(e) => Err(e.into()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::SCHEMA;

  fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
      .execute(
        "INSERT INTO asset (id, name, description, created_at) VALUES ('SN-1', 'One', '', 'x')",
        [],
      )
      .unwrap();
    conn
  }

  #[test]
  fn losing_submodel_insert_reuses_winner() {
    let conn = conn();
    let (first, created) = insert_submodel(&conn, "SN-1", "OperationalData", "t").unwrap();
    assert!(created);

    let (second, created) = insert_submodel(&conn, "SN-1", "OperationalData", "t").unwrap();
    assert!(!created);
    assert_eq!(first, second);

    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM submodel", [], |r| r.get(0))
      .unwrap();
    assert_eq!(count, 1);
  }

  #[test]
  fn losing_element_insert_is_not_an_error() {
    let conn = conn();
    let (sm, _) = insert_submodel(&conn, "SN-1", "OperationalData", "t").unwrap();
    assert!(insert_element(&conn, &sm, "velocity", "t").unwrap());
    assert!(!insert_element(&conn, &sm, "velocity", "t").unwrap());
  }

  #[test]
  fn unrelated_failures_still_propagate() {
    let conn = conn();
    // Unknown asset: foreign-key violation, not a uniqueness one.
    let err = insert_submodel(&conn, "SN-missing", "OperationalData", "t").unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)));
  }

  #[test]
  fn same_title_under_two_assets_is_two_submodels() {
    let conn = conn();
    conn
      .execute(
        "INSERT INTO asset (id, name, description, created_at) VALUES ('SN-2', 'Two', '', 'x')",
        [],
      )
      .unwrap();
    let (a, _) = insert_submodel(&conn, "SN-1", "OperationalData", "t").unwrap();
    let (b, created) = insert_submodel(&conn, "SN-2", "OperationalData", "t").unwrap();
    assert!(created);
    assert_ne!(a, b);
  }
}
