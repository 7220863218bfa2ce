//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that string
//! order in SQL is chronological order. UUIDs are stored as hyphenated
//! lowercase strings.

use aas_core::shell::{Asset, HistoryEntry, Submodel, SubmodelElement, ValueType};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `asset` row.
pub struct RawAsset {
  pub id:          String,
  pub name:        String,
  pub description: String,
  pub created_at:  String,
}

impl RawAsset {
  pub const COLUMNS: &'static str = "id, name, description, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      created_at:  row.get(3)?,
    })
  }

  pub fn into_asset(self) -> Result<Asset> {
    Ok(Asset {
      asset_id:    self.id,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `submodel` row.
pub struct RawSubmodel {
  pub id:          String,
  pub asset_id:    String,
  pub title:       String,
  pub semantic_id: String,
  pub created_at:  String,
}

impl RawSubmodel {
  pub const COLUMNS: &'static str = "id, asset_id, title, semantic_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      asset_id:    row.get(1)?,
      title:       row.get(2)?,
      semantic_id: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_submodel(self) -> Result<Submodel> {
    Ok(Submodel {
      submodel_id: decode_uuid(&self.id)?,
      asset_id:    self.asset_id,
      title:       self.title,
      semantic_id: self.semantic_id,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `submodel_element` row.
pub struct RawElement {
  pub id:          String,
  pub submodel_id: String,
  pub key:         String,
  pub value:       Option<String>,
  pub value_type:  String,
  pub created_at:  String,
}

impl RawElement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      submodel_id: row.get(1)?,
      key:         row.get(2)?,
      value:       row.get(3)?,
      value_type:  row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_element(self) -> Result<SubmodelElement> {
    Ok(SubmodelElement {
      element_id:  decode_uuid(&self.id)?,
      submodel_id: decode_uuid(&self.submodel_id)?,
      key:         self.key,
      value:       self.value,
      value_type:  ValueType::parse(&self.value_type)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `submodel_element_history` row.
pub struct RawHistory {
  pub id:          String,
  pub element_id:  String,
  pub value:       String,
  pub recorded_at: String,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      element_id:  row.get(1)?,
      value:       row.get(2)?,
      recorded_at: row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      history_id:  decode_uuid(&self.id)?,
      element_id:  decode_uuid(&self.element_id)?,
      value:       self.value,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(500);
    let c = a + chrono::Duration::nanoseconds(1);

    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert_eq!(ea, "2025-01-01T12:00:00.000000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < ec && ec < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }
}
