//! Core types and pure transformations for the fit lift-record layer.
//!
//! This crate is deliberately free of database and HTTP dependencies. It owns
//! the typed records, the normalization and deduplication rules, the
//! [`RecordStore`](store::RecordStore) abstraction and the query gateway built
//! on top of it.

pub mod catalog;
pub mod dedup;
pub mod error;
pub mod gateway;
pub mod lift;
pub mod normalize;
pub mod store;
pub mod table;

pub use error::{Classify, Error, ErrorKind, Result};
