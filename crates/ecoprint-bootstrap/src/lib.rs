//! Schema bootstrapper for the EcoPrint prediction log.
//!
//! [`initialize`] takes any [`DocumentStore`](ecoprint_core::store::DocumentStore)
//! and sets up the `predictions`, `feedback` and `metrics` collections with
//! their validators and indexes, then optionally seeds one sample prediction.

mod bootstrap;
pub mod config;
pub mod error;
pub mod seed;

pub use bootstrap::{BootstrapOptions, BootstrapReport, DEFAULT_DATABASE, initialize};
pub use config::BootstrapConfig;
pub use error::SetupError;
