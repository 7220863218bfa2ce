//! Query service: read-only projections over the four tables.
//!
//! Projections built from several statements run inside one read transaction
//! so they observe a single snapshot, never half of a reading.

use std::collections::BTreeMap;

use aas_core::shell::{Asset, AssetView, HistoryEntry, SubmodelElement, SubmodelView};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result,
  encode::{RawAsset, RawElement, RawHistory, RawSubmodel},
};

const ELEMENT_BY_PATH: &str = "
  SELECT e.id, e.submodel_id, e.key, e.value, e.value_type, e.created_at
  FROM submodel_element e
  JOIN submodel s ON s.id = e.submodel_id
  WHERE s.asset_id = ?1 AND s.title = ?2 AND e.key = ?3";

pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM asset ORDER BY created_at, rowid",
    RawAsset::COLUMNS
  ))?;
  let raws = stmt
    .query_map([], RawAsset::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawAsset::into_asset).collect()
}

pub fn get_asset(conn: &mut Connection, asset_id: &str) -> Result<Option<AssetView>> {
  let tx = conn.transaction()?;

  let raw = tx
    .query_row(
      &format!("SELECT {} FROM asset WHERE id = ?1", RawAsset::COLUMNS),
      params![asset_id],
      RawAsset::from_row,
    )
    .optional()?;
  let Some(raw) = raw else {
    return Ok(None);
  };

  let raw_submodels = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {} FROM submodel WHERE asset_id = ?1 ORDER BY created_at, rowid",
      RawSubmodel::COLUMNS
    ))?;
    stmt
      .query_map(params![asset_id], RawSubmodel::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let mut submodels = Vec::with_capacity(raw_submodels.len());
  for raw_sm in raw_submodels {
    let values = element_values(&tx, &raw_sm.id)?;
    submodels.push(SubmodelView { submodel: raw_sm.into_submodel()?, values });
  }
  tx.commit()?;

  Ok(Some(AssetView { asset: raw.into_asset()?, submodels }))
}

pub fn get_submodel(
  conn: &mut Connection,
  asset_id: &str,
  title: &str,
) -> Result<Option<SubmodelView>> {
  let tx = conn.transaction()?;

  let raw = tx
    .query_row(
      &format!(
        "SELECT {} FROM submodel WHERE asset_id = ?1 AND title = ?2",
        RawSubmodel::COLUMNS
      ),
      params![asset_id, title],
      RawSubmodel::from_row,
    )
    .optional()?;
  let Some(raw) = raw else {
    return Ok(None);
  };

  let values = element_values(&tx, &raw.id)?;
  tx.commit()?;

  Ok(Some(SubmodelView { submodel: raw.into_submodel()?, values }))
}

pub fn get_element(
  conn: &Connection,
  asset_id: &str,
  title: &str,
  key: &str,
) -> Result<Option<SubmodelElement>> {
  conn
    .query_row(ELEMENT_BY_PATH, params![asset_id, title, key], RawElement::from_row)
    .optional()?
    .map(RawElement::into_element)
    .transpose()
}

pub fn get_element_history(
  conn: &mut Connection,
  asset_id: &str,
  title: &str,
  key: &str,
) -> Result<Option<Vec<HistoryEntry>>> {
  let tx = conn.transaction()?;

  let element = tx
    .query_row(ELEMENT_BY_PATH, params![asset_id, title, key], RawElement::from_row)
    .optional()?;
  let Some(element) = element else {
    return Ok(None);
  };

  let raws = {
    let mut stmt = tx.prepare(
      "SELECT id, submodel_element_id, value, recorded_at
       FROM submodel_element_history
       WHERE submodel_element_id = ?1
       ORDER BY recorded_at DESC, rowid DESC",
    )?;
    stmt
      .query_map(params![element.id], RawHistory::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  tx.commit()?;

  raws
    .into_iter()
    .map(RawHistory::into_entry)
    .collect::<Result<Vec<_>>>()
    .map(Some)
}

/// Element key → current value for one submodel.
fn element_values(
  conn: &Connection,
  submodel_id: &str,
) -> Result<BTreeMap<String, Option<String>>> {
  let mut stmt = conn.prepare("SELECT key, value FROM submodel_element WHERE submodel_id = ?1")?;
  let values = stmt
    .query_map(params![submodel_id], |r| Ok((r.get(0)?, r.get(1)?)))?
    .collect::<rusqlite::Result<BTreeMap<String, Option<String>>>>()?;
  Ok(values)
}
