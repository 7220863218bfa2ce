//! Async HTTP client wrapping the AAS read API.

use std::time::Duration;

use aas_core::shell::{Asset, AssetView, HistoryEntry, SubmodelElement, SubmodelView};
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Connection settings for the AAS API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Async HTTP client for the AAS JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(self.config.base_url.trim_end_matches('/'))
      .with_context(|| format!("invalid server URL {}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("server URL {} cannot be a base", self.config.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  /// GET `segments` and decode the JSON body. Non-2xx responses become
  /// errors carrying the server's `error` message when there is one.
  async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
    let url = self.url(segments)?;
    let resp = self
      .client
      .get(url.clone())
      .send()
      .await
      .with_context(|| format!("GET {url} failed"))?;

    let status = resp.status();
    if !status.is_success() {
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("error")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| status.to_string());
      return Err(anyhow!("GET {} → {status}: {message}", url.path()));
    }
    resp.json().await.with_context(|| format!("deserialising {}", url.path()))
  }

  // ── Assets ────────────────────────────────────────────────────────────────

  /// `GET /aas/list`
  pub async fn list_assets(&self) -> Result<Vec<Asset>> { self.get(&["aas", "list"]).await }

  /// `GET /aas/<id>`
  pub async fn get_asset(&self, asset_id: &str) -> Result<AssetView> {
    self.get(&["aas", asset_id]).await
  }

  // ── Submodels ─────────────────────────────────────────────────────────────

  /// `GET /aas/<id>/submodel/<title>`
  pub async fn get_submodel(&self, asset_id: &str, title: &str) -> Result<SubmodelView> {
    self.get(&["aas", asset_id, "submodel", title]).await
  }

  /// `GET /aas/<id>/submodel/<title>/element/<key>`
  pub async fn get_element(
    &self,
    asset_id: &str,
    title: &str,
    key: &str,
  ) -> Result<SubmodelElement> {
    self
      .get(&["aas", asset_id, "submodel", title, "element", key])
      .await
  }

  /// `GET /aas/<id>/submodel/<title>/element/<key>/history`
  pub async fn get_history(
    &self,
    asset_id: &str,
    title: &str,
    key: &str,
  ) -> Result<Vec<HistoryEntry>> {
    self
      .get(&["aas", asset_id, "submodel", title, "element", key, "history"])
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.to_owned(),
      timeout:  Duration::from_secs(1),
    })
    .unwrap()
  }

  #[test]
  fn url_joins_segments() {
    let url = client("http://localhost:5000/").url(&["aas", "SN-1"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/aas/SN-1");
  }

  #[test]
  fn url_keeps_a_path_prefix() {
    let url = client("http://host/telemetry").url(&["aas", "list"]).unwrap();
    assert_eq!(url.as_str(), "http://host/telemetry/aas/list");
  }

  #[test]
  fn url_escapes_segments() {
    let url = client("http://host").url(&["aas", "SN 1/2"]).unwrap();
    assert_eq!(url.path(), "/aas/SN%201%2F2");
  }

  #[test]
  fn invalid_base_url_is_an_error() {
    assert!(client("not a url").url(&["aas"]).is_err());
  }
}
