//! # Scenario Rules
//!
//! The data crate for the scenario simulation engine. It holds everything that
//! describes a branching scenario and a user's walk through it, without any
//! storage or logging concerns.
//!
//! - **graph**: immutable scenario graphs, their nodes and scored choices
//! - **progress**: the per-run progress record and its path entries
//! - **scoring**: max-score bound, percentage normalisation and outcome tiers
//! - **catalog**: TOML seed catalogs, validated at load time

pub mod catalog;
pub mod graph;
pub mod progress;
pub mod scoring;

pub use catalog::*;
pub use graph::*;
pub use progress::*;
pub use scoring::*;
