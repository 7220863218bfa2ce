//! Handlers for asset-level endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/aas/list` | Summary of every asset |
//! | `GET`  | `/aas/:aas_id` | Asset with submodels and current values; 404 if absent |

use std::sync::Arc;

use aas_core::{
  shell::{Asset, AssetView},
  store::ShellStore,
};
use axum::{
  Json,
  extract::{Path, State},
};

use crate::error::ApiError;

/// `GET /aas/list`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Asset>>, ApiError>
where
  S: ShellStore,
{
  let assets = store.list_assets().await.map_err(ApiError::store)?;
  Ok(Json(assets))
}

/// `GET /aas/:aas_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(aas_id): Path<String>,
) -> Result<Json<AssetView>, ApiError>
where
  S: ShellStore,
{
  let view = store
    .get_asset(&aas_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("AAS {aas_id} not found")))?;
  Ok(Json(view))
}
