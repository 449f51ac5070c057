//! Aggregates for the Tembea marketplace.
//!
//! Two stores own all durable application state:
//!
//! - [`session`]: the current-session user (restore, login, signup, logout)
//! - [`catalog`]: the event catalog and booking ledger

pub mod catalog;
pub mod session;

pub use catalog::{CatalogAction, CatalogEnvironment, CatalogReducer};
pub use session::{SessionAction, SessionEnvironment, SessionReducer};
