//! Core types and trait definitions for the AAS telemetry store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ShellStore`]; the API, server and CLI
//! crates depend only on the types defined here.

// Native `async fn` in traits; the trait spells out `Send` bounds itself.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod reading;
pub mod shell;
pub mod store;
pub mod template;
pub mod value;

pub use error::{Error, Result};
pub use reading::Reading;
pub use template::{SubmodelTemplate, Template};
pub use value::Value;
