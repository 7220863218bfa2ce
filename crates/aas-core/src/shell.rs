//! Asset Administration Shell records and read models.
//!
//! An asset owns submodels; a submodel owns elements; an element owns an
//! append-only history. The element row carries the latest value, which
//! always matches the newest history entry once a write has committed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Identity of an asset to synchronize; input to
/// [`ShellStore::ensure_structure`](crate::store::ShellStore::ensure_structure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAsset {
  /// External, globally unique id such as a serial number.
  pub asset_id:    String,
  pub name:        String,
  pub description: String,
}

impl NewAsset {
  pub fn new(
    asset_id: impl Into<String>,
    name: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      asset_id:    asset_id.into(),
      name:        name.into(),
      description: description.into(),
    }
  }

  pub fn validate(&self) -> Result<()> { validate_asset_id(&self.asset_id) }
}

/// Ids that the read API routes as a static path segment (`/aas/list`).
pub const RESERVED_ASSET_IDS: &[&str] = &["list"];

pub fn validate_asset_id(asset_id: &str) -> Result<()> {
  if asset_id.trim().is_empty() {
    return Err(Error::InvalidInput("asset id is empty".into()));
  }
  if RESERVED_ASSET_IDS.contains(&asset_id) {
    return Err(Error::InvalidInput(format!("asset id {asset_id:?} is reserved")));
  }
  Ok(())
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
  pub asset_id:    String,
  pub name:        String,
  pub description: String,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submodel {
  pub submodel_id: Uuid,
  pub asset_id:    String,
  /// Unique per asset.
  pub title:       String,
  pub semantic_id: String,
  pub created_at:  DateTime<Utc>,
}

/// The declared type of an element's value. Values are stored untyped, so
/// this is always [`ValueType::String`] for now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
  #[default]
  String,
}

impl ValueType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::String => "string",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "string" => Ok(Self::String),
      other => Err(Error::UnknownValueType(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelElement {
  pub element_id:  Uuid,
  pub submodel_id: Uuid,
  /// Unique per submodel.
  pub key:         String,
  /// Latest recorded value; `None` until the first reading lands.
  pub value:       Option<String>,
  pub value_type:  ValueType,
  pub created_at:  DateTime<Utc>,
}

/// One immutable history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub history_id:  Uuid,
  pub element_id:  Uuid,
  pub value:       String,
  pub recorded_at: DateTime<Utc>,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A submodel with the current value of each of its elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelView {
  #[serde(flatten)]
  pub submodel: Submodel,
  pub values:   BTreeMap<String, Option<String>>,
}

/// An asset with all of its submodels, never stored, always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetView {
  #[serde(flatten)]
  pub asset:     Asset,
  /// In creation order.
  pub submodels: Vec<SubmodelView>,
}

impl AssetView {
  pub fn submodel(&self, title: &str) -> Option<&SubmodelView> {
    self.submodels.iter().find(|s| s.submodel.title == title)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn asset_id_must_be_non_blank() {
    assert!(validate_asset_id("SN-MIR1234").is_ok());
    assert!(matches!(validate_asset_id(""), Err(Error::InvalidInput(_))));
    assert!(matches!(validate_asset_id(" \t"), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn route_segment_ids_are_reserved() {
    let err = NewAsset::new("list", "Lister", "").validate().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("reserved")));
    assert!(validate_asset_id("list-2").is_ok());
  }
}
