//! # Scenario Engine
//!
//! The server-authoritative side of interactive scenario simulations. Each
//! request is handled on its own: the engine keeps no state between calls and
//! reads everything it needs from the persisted progress record and the
//! read-only scenario graph.
//!
//! ## Core Components
//!
//! - **walker**: starts runs and applies submitted choices, completing runs and awarding XP
//! - **history**: read-only list of a user's completed runs
//! - **catalog**: read-only listing of the scenarios users can start
//! - **repository**: the storage seam, with an in-memory implementation and the seeding step
//! - **capabilities**: the XP ledger and the clock the engine calls into
//!
//! Errors follow the taxonomy in [`SimulationError`]; every rejected request
//! leaves the stored progress record untouched.

pub mod capabilities;
pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod repository;
pub mod walker;

pub use capabilities::*;
pub use catalog::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use repository::*;
pub use walker::*;
