//! [`SqliteStore`] — the SQLite implementation of [`ShellStore`].

use std::{path::Path, time::Duration};

use aas_core::{
  Reading, Template,
  shell::{
    Asset, AssetView, HistoryEntry, NewAsset, SubmodelElement, SubmodelView, validate_asset_id,
  },
  store::{RecordedReading, ShellStore, StructureReport, WritePolicy},
};
use chrono::Utc;

use crate::{Result, query, schema::SCHEMA, sync, write};

/// How long a connection waits on another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An AAS store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and clones
/// share it. Independent writers (one per worker) should each [`open`] their
/// own store on the same file instead; SQLite then arbitrates between them.
///
/// [`open`]: SqliteStore::open
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  policy: WritePolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and ensure the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn, policy: WritePolicy::default() };
    store.ensure_schema().await?;
    Ok(store)
  }

  /// Use `policy` for every subsequent [`ShellStore::record_reading`].
  pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn write_policy(&self) -> WritePolicy { self.policy }

  /// Create the four tables, their constraints and triggers if absent.
  ///
  /// Idempotent; [`open`](Self::open) already calls it once.
  pub async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` against the raw connection. Test-only escape hatch for
  /// inspecting and tampering with rows.
  #[cfg(test)]
  pub(crate) async fn with_conn<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    Ok(self.conn.call(move |conn| Ok(f(conn)?)).await?)
  }
}

// ─── ShellStore impl ─────────────────────────────────────────────────────────

impl ShellStore for SqliteStore {
  type Error = crate::Error;

  // ── Structure ─────────────────────────────────────────────────────────────

  async fn ensure_structure(
    &self,
    asset: NewAsset,
    template: &Template,
  ) -> Result<StructureReport> {
    asset.validate()?;
    template.validate()?;

    let template = template.clone();
    self
      .conn
      .call(move |conn| Ok(sync::ensure_structure(conn, &asset, &template, Utc::now())))
      .await?
  }

  // ── Readings ──────────────────────────────────────────────────────────────

  async fn record_reading(
    &self,
    asset_id: &str,
    template: &Template,
    reading: Reading,
  ) -> Result<RecordedReading> {
    validate_asset_id(asset_id)?;
    template.validate()?;

    let asset_id = asset_id.to_owned();
    let template = template.clone();
    let policy   = self.policy;
    self
      .conn
      .call(move |conn| {
        Ok(write::record_reading(conn, &asset_id, &template, &reading, policy, Utc::now))
      })
      .await?
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_asset(&self, asset_id: &str) -> Result<Option<AssetView>> {
    let asset_id = asset_id.to_owned();
    self
      .conn
      .call(move |conn| Ok(query::get_asset(conn, &asset_id)))
      .await?
  }

  async fn get_submodel(&self, asset_id: &str, title: &str) -> Result<Option<SubmodelView>> {
    let asset_id = asset_id.to_owned();
    let title    = title.to_owned();
    self
      .conn
      .call(move |conn| Ok(query::get_submodel(conn, &asset_id, &title)))
      .await?
  }

  async fn get_element(
    &self,
    asset_id: &str,
    title:    &str,
    key:      &str,
  ) -> Result<Option<SubmodelElement>> {
    let asset_id = asset_id.to_owned();
    let title    = title.to_owned();
    let key      = key.to_owned();
    self
      .conn
      .call(move |conn| Ok(query::get_element(conn, &asset_id, &title, &key)))
      .await?
  }

  async fn get_element_history(
    &self,
    asset_id: &str,
    title:    &str,
    key:      &str,
  ) -> Result<Option<Vec<HistoryEntry>>> {
    let asset_id = asset_id.to_owned();
    let title    = title.to_owned();
    let key      = key.to_owned();
    self
      .conn
      .call(move |conn| Ok(query::get_element_history(conn, &asset_id, &title, &key)))
      .await?
  }

  async fn list_assets(&self) -> Result<Vec<Asset>> {
    self.conn.call(|conn| Ok(query::list_assets(conn))).await?
  }
}
