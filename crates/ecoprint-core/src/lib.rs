//! Core types and trait definitions for the EcoPrint prediction log.
//!
//! This crate is deliberately free of database dependencies. It describes the
//! three record kinds, the validators and indexes declared for their
//! collections, and the [`store::DocumentStore`] abstraction that backends
//! implement.

pub mod date;
pub mod error;
pub mod index;
pub mod record;
pub mod schema;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use store::{Document, Namespace};
