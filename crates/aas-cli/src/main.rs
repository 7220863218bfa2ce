//! `aas` — command-line client for the AAS telemetry API.
//!
//! # Usage
//!
//! ```text
//! aas list
//! aas asset SN-MIR1234
//! aas history SN-MIR1234 OperationalData battery_percentage --limit 10
//! aas --url http://robots.local:5000 --json element SN-KUKA1234 Process_Data program_state
//! ```

mod client;
mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};

const DEFAULT_URL: &str = "http://localhost:5000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "aas", about = "Query the AAS telemetry API")]
struct Args {
  /// Path to a TOML config file (url, timeout_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the AAS server (default: http://localhost:5000).
  #[arg(long, env = "AAS_URL")]
  url: Option<String>,

  /// Print raw JSON instead of a table.
  #[arg(long)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every asset.
  List,
  /// Show an asset with the current values of all its submodels.
  Asset { asset_id: String },
  /// Show the current values of one submodel.
  Submodel { asset_id: String, title: String },
  /// Show one element.
  Element {
    asset_id: String,
    title:    String,
    key:      String,
  },
  /// Show an element's recorded values, newest first.
  History {
    asset_id: String,
    title:    String,
    key:      String,
    /// Show at most this many entries.
    #[arg(long)]
    limit:    Option<usize>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  timeout_secs: Option<u64>,
}

/// CLI flag, then config file, then [`DEFAULT_URL`].
fn resolve_url(flag: Option<String>, file: &ConfigFile) -> String {
  flag
    .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let api_config = ApiConfig {
    base_url: resolve_url(args.url, &file_cfg),
    timeout:  Duration::from_secs(file_cfg.timeout_secs.unwrap_or(30)),
  };
  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::List => {
      let assets = client.list_assets().await?;
      emit(args.json, assets.as_slice(), render::assets)?;
    }
    Command::Asset { asset_id } => {
      let view = client.get_asset(&asset_id).await?;
      emit(args.json, &view, render::asset)?;
    }
    Command::Submodel { asset_id, title } => {
      let view = client.get_submodel(&asset_id, &title).await?;
      emit(args.json, &view, render::submodel)?;
    }
    Command::Element { asset_id, title, key } => {
      let element = client.get_element(&asset_id, &title, &key).await?;
      emit(args.json, &element, render::element)?;
    }
    Command::History { asset_id, title, key, limit } => {
      let mut history = client.get_history(&asset_id, &title, &key).await?;
      if let Some(limit) = limit {
        history.truncate(limit);
      }
      emit(args.json, history.as_slice(), render::history)?;
    }
  }

  Ok(())
}

/// Print `value` as pretty JSON or through its table renderer.
fn emit<T>(json: bool, value: &T, table: impl Fn(&T) -> String) -> Result<()>
where
  T: Serialize + ?Sized,
{
  if json {
    println!("{}", serde_json::to_string_pretty(value).context("serialising output")?);
  } else {
    print!("{}", table(value));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flag_beats_file_beats_default() {
    let file = ConfigFile { url: "http://file:1".to_owned(), timeout_secs: None };
    assert_eq!(resolve_url(Some("http://flag:2".to_owned()), &file), "http://flag:2");
    assert_eq!(resolve_url(None, &file), "http://file:1");
    assert_eq!(resolve_url(None, &ConfigFile::default()), DEFAULT_URL);
  }

  #[test]
  fn config_file_fields_are_optional() {
    let cfg: ConfigFile = toml::from_str("timeout_secs = 5").unwrap();
    assert!(cfg.url.is_empty());
    assert_eq!(cfg.timeout_secs, Some(5));
  }

  #[test]
  fn history_subcommand_parses_limit() {
    let args = Args::try_parse_from([
      "aas", "history", "SN-1", "OperationalData", "velocity", "--limit", "3",
    ])
    .unwrap();
    let Command::History { limit, key, .. } = args.command else {
      panic!("expected history");
    };
    assert_eq!(limit, Some(3));
    assert_eq!(key, "velocity");
  }
}
