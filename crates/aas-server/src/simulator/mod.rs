//! Simulated telemetry sources and the workers that persist their readings.
//!
//! Each [`Worker`] owns one [`ReadingSource`] and one store handle. On every
//! tick it draws a reading, makes sure the asset's structure exists (once per
//! worker, retried until it succeeds), and records the reading. Failures are
//! logged and the loop keeps going; only the stop signal ends it.

pub mod kuka;
pub mod mir;

use std::time::Duration;

use aas_core::{
  Reading, Template,
  shell::NewAsset,
  store::{RecordedReading, ShellStore},
};
use rand::Rng;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

pub use kuka::KukaSource;
pub use mir::MirSource;

/// A device that produces readings against a fixed template.
pub trait ReadingSource: Send + Sync {
  /// The asset this source reports for.
  fn asset(&self) -> NewAsset;

  fn template(&self) -> &Template;

  /// Draw the next reading. Keys outside [`Self::template`] are skipped by
  /// a lenient store and rejected by a strict one.
  fn next_reading(&mut self) -> Reading;
}

impl<R: ReadingSource + ?Sized> ReadingSource for Box<R> {
  fn asset(&self) -> NewAsset { (**self).asset() }

  fn template(&self) -> &Template { (**self).template() }

  fn next_reading(&mut self) -> Reading { (**self).next_reading() }
}

pub(crate) fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }

pub(crate) fn pick<'a>(rng: &mut impl Rng, options: &[&'a str]) -> &'a str {
  options[rng.random_range(0..options.len())]
}

// ─── Worker ───────────────────────────────────────────────────────────────────

pub struct Worker<S, R> {
  store:      S,
  source:     R,
  asset:      NewAsset,
  interval:   Duration,
  structured: bool,
}

impl<S, R> Worker<S, R>
where
  S: ShellStore,
  R: ReadingSource,
{
  pub fn new(store: S, source: R, interval: Duration) -> Self {
    let asset = source.asset();
    Self { store, source, asset, interval, structured: false }
  }

  pub fn asset_id(&self) -> &str { &self.asset.asset_id }

  /// One tick: sync structure if not yet done, then record a reading.
  pub async fn run_cycle(&mut self) -> Result<RecordedReading, S::Error> {
    let reading = self.source.next_reading();

    if !self.structured {
      let report = self
        .store
        .ensure_structure(self.asset.clone(), self.source.template())
        .await?;
      info!(
        asset_id = %self.asset.asset_id,
        asset_created = report.asset_created,
        submodels_created = report.submodels_created,
        elements_created = report.elements_created,
        "structure synchronized"
      );
      self.structured = true;
    }

    let recorded = self
      .store
      .record_reading(&self.asset.asset_id, self.source.template(), reading)
      .await?;
    debug!(
      asset_id = %self.asset.asset_id,
      written = recorded.elements_written,
      skipped = recorded.skipped.len(),
      "reading recorded"
    );
    Ok(recorded)
  }

  /// Tick every `interval` until `stop` flips to `true` or its sender is
  /// dropped. A stop already requested means no cycle runs at all.
  pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
    info!(asset_id = %self.asset.asset_id, interval = ?self.interval, "worker started");

    loop {
      if *stop.borrow() {
        break;
      }

      if let Err(e) = self.run_cycle().await {
        warn!(asset_id = %self.asset.asset_id, error = %e, "reading cycle failed");
      }

      tokio::select! {
        _ = tokio::time::sleep(self.interval) => {}
        changed = stop.changed() => {
          if changed.is_err() {
            break;
          }
        }
      }
    }

    info!(asset_id = %self.asset.asset_id, "worker stopped");
  }
}

/// Spawn `worker` onto the runtime.
pub fn spawn<S, R>(worker: Worker<S, R>, stop: watch::Receiver<bool>) -> JoinHandle<()>
where
  S: ShellStore + 'static,
  R: ReadingSource + 'static,
{
  tokio::spawn(worker.run(stop))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use aas_core::{
    shell::{Asset, AssetView, HistoryEntry, SubmodelElement, SubmodelView},
    store::StructureReport,
  };
  use aas_store_sqlite::SqliteStore;
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  fn mir() -> MirSource {
    MirSource::with_rng(
      NewAsset::new("SN-MIR1234", "MiR-100", "AAS for MiR-100"),
      StdRng::seed_from_u64(9),
    )
  }

  async fn history_len(store: &SqliteStore, title: &str, key: &str) -> usize {
    store
      .get_element_history("SN-MIR1234", title, key)
      .await
      .unwrap()
      .map_or(0, |h| h.len())
  }

  #[tokio::test]
  async fn first_cycle_builds_structure_and_records() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut worker = Worker::new(store.clone(), mir(), Duration::from_millis(10));

    let recorded = worker.run_cycle().await.unwrap();
    assert_eq!(recorded.elements_written, 16);
    assert!(recorded.skipped.is_empty());

    worker.run_cycle().await.unwrap();
    assert_eq!(history_len(&store, "OperationalData", "battery_percentage").await, 2);

    let view = store.get_asset("SN-MIR1234").await.unwrap().unwrap();
    assert_eq!(view.submodels.len(), 3);
    assert_eq!(view.asset.name, "MiR-100");
  }

  #[tokio::test]
  async fn boxed_sources_work_like_concrete_ones() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let source: Box<dyn ReadingSource> = Box::new(mir());
    let mut worker = Worker::new(store.clone(), source, Duration::from_millis(10));

    assert_eq!(worker.asset_id(), "SN-MIR1234");
    worker.run_cycle().await.unwrap();
    assert_eq!(history_len(&store, "NavigationAndMission", "positionX").await, 1);
  }

  #[tokio::test]
  async fn stop_requested_before_start_runs_no_cycle() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (tx, rx) = watch::channel(true);

    Worker::new(store.clone(), mir(), Duration::from_millis(10)).run(rx).await;
    drop(tx);

    assert!(store.get_asset("SN-MIR1234").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn stop_signal_ends_a_running_worker() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (tx, rx) = watch::channel(false);
    let handle = spawn(Worker::new(store.clone(), mir(), Duration::from_millis(5)), rx);

    let mut waited = 0;
    while history_len(&store, "OperationalData", "velocity").await < 2 && waited < 200 {
      tokio::time::sleep(Duration::from_millis(5)).await;
      waited += 1;
    }
    assert!(history_len(&store, "OperationalData", "velocity").await >= 2);

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
      .await
      .expect("worker did not stop")
      .unwrap();
  }

  #[tokio::test]
  async fn dropped_sender_ends_the_worker() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (tx, rx) = watch::channel(false);
    let handle = spawn(Worker::new(store, mir(), Duration::from_secs(60)), rx);

    drop(tx);
    tokio::time::timeout(Duration::from_secs(5), handle)
      .await
      .expect("worker did not stop")
      .unwrap();
  }

  // ── Failure handling ────────────────────────────────────────────────────────

  /// A store whose structure writes always fail.
  #[derive(Clone, Default)]
  struct FailingStore {
    attempts: Arc<AtomicUsize>,
  }

  fn unavailable() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store unavailable")
  }

  impl ShellStore for FailingStore {
    type Error = std::io::Error;

    async fn ensure_structure<'a>(
      &'a self,
      _asset: NewAsset,
      _template: &'a Template,
    ) -> Result<StructureReport, Self::Error> {
      self.attempts.fetch_add(1, Ordering::SeqCst);
      Err(unavailable())
    }

    async fn record_reading<'a>(
      &'a self,
      _asset_id: &'a str,
      _template: &'a Template,
      _reading: Reading,
    ) -> Result<RecordedReading, Self::Error> {
      Err(unavailable())
    }

    async fn get_asset<'a>(&'a self, _: &'a str) -> Result<Option<AssetView>, Self::Error> {
      Ok(None)
    }

    async fn get_submodel<'a>(
      &'a self,
      _: &'a str,
      _: &'a str,
    ) -> Result<Option<SubmodelView>, Self::Error> {
      Ok(None)
    }

    async fn get_element<'a>(
      &'a self,
      _: &'a str,
      _: &'a str,
      _: &'a str,
    ) -> Result<Option<SubmodelElement>, Self::Error> {
      Ok(None)
    }

    async fn get_element_history<'a>(
      &'a self,
      _: &'a str,
      _: &'a str,
      _: &'a str,
    ) -> Result<Option<Vec<HistoryEntry>>, Self::Error> {
      Ok(None)
    }

    async fn list_assets(&self) -> Result<Vec<Asset>, Self::Error> { Ok(Vec::new()) }
  }

  #[tokio::test]
  async fn structure_failures_are_retried_every_cycle() {
    let store = FailingStore::default();
    let mut worker = Worker::new(store.clone(), mir(), Duration::from_millis(1));

    assert!(worker.run_cycle().await.is_err());
    assert!(worker.run_cycle().await.is_err());
    assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn failing_cycles_do_not_end_the_loop() {
    let store = FailingStore::default();
    let (tx, rx) = watch::channel(false);
    let handle = spawn(Worker::new(store.clone(), mir(), Duration::from_millis(2)), rx);

    let mut waited = 0;
    while store.attempts.load(Ordering::SeqCst) < 3 && waited < 500 {
      tokio::time::sleep(Duration::from_millis(2)).await;
      waited += 1;
    }
    assert!(store.attempts.load(Ordering::SeqCst) >= 3);

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
      .await
      .expect("worker did not stop")
      .unwrap();
  }
}
