//! The `ShellStore` trait and its supporting result types.
//!
//! The trait is implemented by storage backends (e.g. `aas-store-sqlite`).
//! The read API and the simulator workers depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Reading, Template,
  shell::{Asset, AssetView, HistoryEntry, NewAsset, SubmodelElement, SubmodelView},
};

// ─── Write policy ────────────────────────────────────────────────────────────

/// How the reading writer treats readings that do not line up with the
/// persisted structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
  /// Skip missing submodels and elements; ignore undeclared reading keys.
  #[default]
  Lenient,
  /// Fail the whole reading on a missing submodel or element, or on a
  /// reading key the template does not declare.
  Strict,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// What a call to [`ShellStore::ensure_structure`] had to create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
  pub asset_created:     bool,
  pub submodels_created: usize,
  pub elements_created:  usize,
}

impl StructureReport {
  /// `true` when everything already existed.
  pub fn is_noop(&self) -> bool {
    !self.asset_created && self.submodels_created == 0 && self.elements_created == 0
  }
}

/// The outcome of one committed [`ShellStore::record_reading`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedReading {
  /// Shared by every history row written for this reading.
  pub recorded_at:      DateTime<Utc>,
  pub elements_written: usize,
  /// Keys skipped under [`WritePolicy::Lenient`], as `title/key`.
  pub skipped:          Vec<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an AAS store backend.
///
/// Structure writes are idempotent; history is append-only; each reading is
/// committed atomically.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ShellStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Structure ─────────────────────────────────────────────────────────

  /// Ensure the asset, every submodel and every element declared by
  /// `template` exist exactly once. Safe to repeat and to race.
  fn ensure_structure<'a>(
    &'a self,
    asset: NewAsset,
    template: &'a Template,
  ) -> impl Future<Output = Result<StructureReport, Self::Error>> + Send + 'a;

  // ── Readings ──────────────────────────────────────────────────────────

  /// Append one history row per written element and overwrite its current
  /// value, all in one atomic unit.
  fn record_reading<'a>(
    &'a self,
    asset_id: &'a str,
    template: &'a Template,
    reading: Reading,
  ) -> impl Future<Output = Result<RecordedReading, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The asset with its submodels and their current values, or `None`.
  fn get_asset<'a>(
    &'a self,
    asset_id: &'a str,
  ) -> impl Future<Output = Result<Option<AssetView>, Self::Error>> + Send + 'a;

  /// The asset's submodel titled `title`, or `None`.
  fn get_submodel<'a>(
    &'a self,
    asset_id: &'a str,
    title: &'a str,
  ) -> impl Future<Output = Result<Option<SubmodelView>, Self::Error>> + Send + 'a;

  /// A single element, or `None` if the asset, submodel or key is unknown.
  fn get_element<'a>(
    &'a self,
    asset_id: &'a str,
    title: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<SubmodelElement>, Self::Error>> + Send + 'a;

  /// An element's history, newest first.
  ///
  /// `None` means the element does not exist; `Some(vec![])` means it exists
  /// but nothing has been recorded yet.
  fn get_element_history<'a>(
    &'a self,
    asset_id: &'a str,
    title: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<HistoryEntry>>, Self::Error>> + Send + 'a;

  /// Every asset, in creation order.
  fn list_assets(
    &self,
  ) -> impl Future<Output = Result<Vec<Asset>, Self::Error>> + Send + '_;
}
