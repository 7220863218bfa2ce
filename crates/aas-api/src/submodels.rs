//! Handlers for submodel, element and history endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/aas/:aas_id/submodel/:title` | Element key → current value |
//! | `GET`  | `/aas/:aas_id/submodel/:title/element/:key` | One element |
//! | `GET`  | `/aas/:aas_id/submodel/:title/element/:key/history` | Newest first; 404 when empty |

use std::sync::Arc;

use aas_core::{
  shell::{HistoryEntry, SubmodelElement, SubmodelView},
  store::ShellStore,
};
use axum::{
  Json,
  extract::{Path, State},
};

use crate::error::ApiError;

/// `GET /aas/:aas_id/submodel/:title`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((aas_id, title)): Path<(String, String)>,
) -> Result<Json<SubmodelView>, ApiError>
where
  S: ShellStore,
{
  let view = store
    .get_submodel(&aas_id, &title)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("submodel {title} not found for AAS {aas_id}"))
    })?;
  Ok(Json(view))
}

/// `GET /aas/:aas_id/submodel/:title/element/:key`
pub async fn element<S>(
  State(store): State<Arc<S>>,
  Path((aas_id, title, key)): Path<(String, String, String)>,
) -> Result<Json<SubmodelElement>, ApiError>
where
  S: ShellStore,
{
  let element = store
    .get_element(&aas_id, &title, &key)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| element_not_found(&aas_id, &title, &key))?;
  Ok(Json(element))
}

/// `GET /aas/:aas_id/submodel/:title/element/:key/history`
///
/// An element that exists but has never been written is also a 404, with its
/// own message.
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path((aas_id, title, key)): Path<(String, String, String)>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: ShellStore,
{
  let history = store
    .get_element_history(&aas_id, &title, &key)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| element_not_found(&aas_id, &title, &key))?;

  if history.is_empty() {
    return Err(ApiError::NotFound(format!(
      "no history recorded for element {key} in submodel {title}"
    )));
  }
  Ok(Json(history))
}

fn element_not_found(aas_id: &str, title: &str, key: &str) -> ApiError {
  ApiError::NotFound(format!(
    "element {key} not found in submodel {title} of AAS {aas_id}"
  ))
}
