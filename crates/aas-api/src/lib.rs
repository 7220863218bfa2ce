//! JSON read API for the AAS telemetry store.
//!
//! Exposes an axum [`Router`] backed by any [`aas_core::store::ShellStore`].
//! The API is read-only; writes come from the simulator workers. Transport
//! concerns (binding, tracing layers) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = aas_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
//! ```

pub mod assets;
pub mod error;
pub mod submodels;

use std::sync::Arc;

use aas_core::store::ShellStore;
use axum::{Router, routing::get};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ShellStore + 'static,
{
  Router::new()
    // Assets; the static segment wins over `{aas_id}`.
    .route("/aas/list", get(assets::list::<S>))
    .route("/aas/{aas_id}", get(assets::get_one::<S>))
    // Submodels and elements
    .route("/aas/{aas_id}/submodel/{title}", get(submodels::get_one::<S>))
    .route(
      "/aas/{aas_id}/submodel/{title}/element/{key}",
      get(submodels::element::<S>),
    )
    .route(
      "/aas/{aas_id}/submodel/{title}/element/{key}/history",
      get(submodels::history::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
