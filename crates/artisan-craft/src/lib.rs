//! # Artisan Craft
//!
//! Recipe-driven crafting core for Project Artisan.
//!
//! This crate provides everything between a host game's inventory and its
//! crafting UI:
//! - Resource ledger with currency pools and generic category tags
//! - Recipe definitions with probabilistic outcomes and cascading discovery
//! - TOML catalog loading with per-record validation
//! - Persisted recipe book with idempotent catalog merges
//! - Timed, queued and instant craft execution driven by host ticks
//! - Event bus for toast/cue requests
//! - Versioned save codec for the persisted state

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod book;
pub mod catalog;
pub mod events;
pub mod host;
pub mod ledger;
pub mod recipe;
pub mod resolve;
pub mod rng;
pub mod save;
pub mod scheduler;
pub mod session;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::book::*;
    pub use crate::catalog::*;
    pub use crate::events::*;
    pub use crate::host::*;
    pub use crate::ledger::*;
    pub use crate::recipe::*;
    pub use crate::resolve::*;
    pub use crate::rng::*;
    pub use crate::save::*;
    pub use crate::scheduler::*;
    pub use crate::session::*;
}

pub use prelude::*;
