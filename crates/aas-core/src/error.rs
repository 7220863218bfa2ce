//! Error types for `aas-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Rejected before any storage call: empty ids, titles, keys or templates.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("asset {asset_id:?} has no submodel {title:?}")]
  MissingSubmodel { asset_id: String, title: String },

  #[error("submodel {title:?} of asset {asset_id:?} has no element {key:?}")]
  MissingElement {
    asset_id: String,
    title:    String,
    key:      String,
  },

  #[error("reading key {0:?} is not declared by the template")]
  UnknownKey(String),

  #[error("unknown value type: {0:?}")]
  UnknownValueType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
