//! SQLite backend for the fit record store.
//!
//! One database file per [`StoreConfig`]. Every operation opens its own
//! connection and closes it before returning, so no connection outlives the
//! call that needed it.

mod config;
mod encode;
mod migrate;
mod schema;
mod store;

pub mod error;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::SqliteStore;
