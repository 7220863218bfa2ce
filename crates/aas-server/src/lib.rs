//! AAS telemetry server.
//!
//! Wires the read API, the SQLite store and the simulator workers together.
//! The binary in `main.rs` is a thin shell around [`ServerConfig`],
//! [`router`] and [`simulator::Worker`].

pub mod simulator;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use aas_core::{
  shell::NewAsset,
  store::{ShellStore, WritePolicy},
};
use axum::Router;
use config::{ConfigError, Environment, Source};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use simulator::{KukaSource, MirSource, ReadingSource};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AAS_*` environment variables. Every field has a default.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Milliseconds between two readings of the same simulator.
  pub interval_ms: u64,
  /// Reject readings that do not match the stored structure.
  pub strict:      bool,
  pub simulators:  Vec<SimulatorConfig>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:        "127.0.0.1".to_owned(),
      port:        5000,
      store_path:  PathBuf::from("aas.sqlite3"),
      interval_ms: 2000,
      strict:      false,
      simulators:  vec![
        SimulatorConfig {
          class:       AssetClass::Mir,
          asset_id:    "SN-MIR1234".to_owned(),
          name:        "MiR-100".to_owned(),
          description: None,
        },
        SimulatorConfig {
          class:       AssetClass::Kuka,
          asset_id:    "SN-KUKA1234".to_owned(),
          name:        "KUKA-ARM-01".to_owned(),
          description: None,
        },
      ],
    }
  }
}

impl ServerConfig {
  /// Load from `path` (optional) layered under `AAS_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_source(config::File::from(path).required(false))
  }

  fn from_source<T>(source: T) -> Result<Self, ConfigError>
  where
    T: Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(source)
      .add_source(Environment::with_prefix("AAS"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms) }

  pub fn write_policy(&self) -> WritePolicy {
    if self.strict { WritePolicy::Strict } else { WritePolicy::Lenient }
  }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
  Mir,
  Kuka,
}

/// One simulated device.
#[derive(Deserialize, Clone, Debug)]
pub struct SimulatorConfig {
  pub class:       AssetClass,
  pub asset_id:    String,
  pub name:        String,
  /// Defaults to `"AAS for {name}"`.
  #[serde(default)]
  pub description: Option<String>,
}

impl SimulatorConfig {
  pub fn asset(&self) -> NewAsset {
    let description = self
      .description
      .clone()
      .unwrap_or_else(|| format!("AAS for {}", self.name));
    NewAsset::new(self.asset_id.clone(), self.name.clone(), description)
  }

  /// A freshly seeded reading source for this device.
  pub fn source(&self) -> Box<dyn ReadingSource> {
    match self.class {
      AssetClass::Mir => Box::new(MirSource::new(self.asset())),
      AssetClass::Kuka => Box::new(KukaSource::new(self.asset())),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The read API with request tracing.
pub fn router<S>(store: S) -> Router
where
  S: ShellStore + 'static,
{
  aas_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use aas_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{File, FileFormat};
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    ServerConfig::from_source(File::from_str(toml, FileFormat::Toml)).unwrap()
  }

  #[test]
  fn empty_file_gives_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:5000");
    assert_eq!(cfg.interval(), Duration::from_secs(2));
    assert_eq!(cfg.write_policy(), WritePolicy::Lenient);
    assert_eq!(cfg.simulators.len(), 2);
    assert_eq!(cfg.simulators[0].class, AssetClass::Mir);
    assert_eq!(cfg.simulators[1].asset_id, "SN-KUKA1234");
  }

  #[test]
  fn file_overrides_fields_and_simulators() {
    let cfg = parse(
      r#"
      port = 8080
      strict = true

      [[simulators]]
      class = "kuka"
      asset_id = "SN-K2"
      name = "Arm Two"
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.write_policy(), WritePolicy::Strict);
    assert_eq!(cfg.simulators.len(), 1);
    assert_eq!(cfg.simulators[0].class, AssetClass::Kuka);
  }

  #[test]
  fn simulator_description_defaults_from_name() {
    let cfg = ServerConfig::default();
    let sim = &cfg.simulators[0];
    let asset = sim.asset();
    assert_eq!(asset.asset_id, "SN-MIR1234");
    assert_eq!(asset.description, "AAS for MiR-100");

    let explicit = SimulatorConfig { description: Some("dock 3".to_owned()), ..sim.clone() };
    assert_eq!(explicit.asset().description, "dock 3");
  }

  #[test]
  fn source_matches_class() {
    let cfg = ServerConfig::default();
    let source = cfg.simulators[1].source();
    assert!(source.template().get("Process_Data").is_some());
    assert_eq!(source.asset().name, "KUKA-ARM-01");
  }

  #[tokio::test]
  async fn router_serves_the_api() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let req = Request::builder().uri("/aas/list").body(Body::empty()).unwrap();
    let resp = router(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
