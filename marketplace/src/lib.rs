//! Tembea - event discovery and booking core for a tourism marketplace
//!
//! Organizers list events; attendees discover and book them. This crate is
//! the state-management core behind that UI: two stores built on the
//! Tembea reducer architecture, durable slot storage, and mocked remote
//! gateways.
//!
//! # Architecture
//!
//! ```text
//! Caller (demo binary, tests, an embedding UI)
//!        │  commands                        │  snapshots
//!        ▼                                  ▼
//! ┌──────────────────┐              ┌──────────────────┐
//! │  Session store   │              │  Catalog store   │
//! │  (auth)          │              │  (events +       │
//! │                  │              │   bookings)      │
//! └────────┬─────────┘              └────────┬─────────┘
//!          │ effects                         │ effects
//!          ▼                                 ▼
//!   AuthGateway (mock)              PaymentGateway (mock)
//!   SlotStore "session"             SlotStore "bookings"
//! ```
//!
//! # Key behaviors
//!
//! - **Mocked auth**: login and signup always succeed; the password is
//!   accepted and discarded. Swapping in real auth means replacing the
//!   [`gateway::AuthGateway`] implementation, nothing else.
//! - **Transactional booking**: the capacity check runs in the same
//!   serialized reducer execution that appends the booking and bumps the
//!   counter, after the payment settles - concurrent bookings cannot
//!   oversell an event.
//! - **Durable slots**: the session and the ledger persist as JSON files;
//!   malformed contents restore as absent instead of failing startup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod analytics;
pub mod app;
pub mod config;
pub mod gateway;
pub mod seed;
pub mod storage;
pub mod types;

pub use aggregates::{CatalogAction, CatalogReducer, SessionAction, SessionReducer};
pub use analytics::{AttendeeSummary, EventFilter, OrganizerSummary};
pub use app::{AppError, MarketplaceApp};
pub use config::Config;
pub use types::*;
