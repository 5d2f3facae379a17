//! Storage seam: scenario graphs and progress records.
//!
//! Graphs are written once by [`seed_repository`] and read-only afterwards.
//! Progress records are updated with a compare-and-swap on their `version`,
//! so two racing writes to one run cannot both land.

mod memory;

pub use memory::*;

use std::sync::Arc;

use scenario_rules::{GraphId, ProgressId, ProgressRecord, ScenarioCatalog, ScenarioGraph, UserId};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    #[error("progress record `{0}` does not exist")]
    MissingProgress(ProgressId),

    #[error("`{0}` already exists")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Read access to scenario graphs, plus the writes seeding and administration need.
pub trait ScenarioRepository: Send + Sync {
    /// Find a graph by id, active or not.
    fn find_graph(&self, id: &GraphId) -> Result<Option<ScenarioGraph>, RepositoryError>;

    fn list_graphs(&self) -> Result<Vec<ScenarioGraph>, RepositoryError>;

    /// Store a new graph. Fails with `Duplicate` if the id is taken.
    fn insert_graph(&self, graph: ScenarioGraph) -> Result<(), RepositoryError>;

    /// Hide a graph from new runs. Returns whether the graph exists.
    fn deactivate_graph(&self, id: &GraphId) -> Result<bool, RepositoryError>;
}

pub trait ProgressRepository: Send + Sync {
    fn find_progress(&self, id: ProgressId) -> Result<Option<ProgressRecord>, RepositoryError>;

    /// Store a new record. Fails with `Duplicate` if the id is taken.
    fn insert_progress(&self, record: &ProgressRecord) -> Result<(), RepositoryError>;

    /// Replace the stored record if its version still equals `expected_version`.
    ///
    /// On success the stored copy carries `expected_version + 1`, which is
    /// returned. On a mismatch nothing is written.
    fn conditional_update_progress(
        &self,
        record: &ProgressRecord,
        expected_version: u64,
    ) -> Result<u64, RepositoryError>;

    /// All completed records belonging to `user_id`, in no particular order.
    fn list_completed_progress(&self, user_id: &UserId) -> Result<Vec<ProgressRecord>, RepositoryError>;
}

impl<T: ScenarioRepository + ?Sized> ScenarioRepository for &T {
    fn find_graph(&self, id: &GraphId) -> Result<Option<ScenarioGraph>, RepositoryError> {
        (**self).find_graph(id)
    }

    fn list_graphs(&self) -> Result<Vec<ScenarioGraph>, RepositoryError> {
        (**self).list_graphs()
    }

    fn insert_graph(&self, graph: ScenarioGraph) -> Result<(), RepositoryError> {
        (**self).insert_graph(graph)
    }

    fn deactivate_graph(&self, id: &GraphId) -> Result<bool, RepositoryError> {
        (**self).deactivate_graph(id)
    }
}

impl<T: ScenarioRepository + ?Sized> ScenarioRepository for Arc<T> {
    fn find_graph(&self, id: &GraphId) -> Result<Option<ScenarioGraph>, RepositoryError> {
        (**self).find_graph(id)
    }

    fn list_graphs(&self) -> Result<Vec<ScenarioGraph>, RepositoryError> {
        (**self).list_graphs()
    }

    fn insert_graph(&self, graph: ScenarioGraph) -> Result<(), RepositoryError> {
        (**self).insert_graph(graph)
    }

    fn deactivate_graph(&self, id: &GraphId) -> Result<bool, RepositoryError> {
        (**self).deactivate_graph(id)
    }
}

impl<T: ProgressRepository + ?Sized> ProgressRepository for &T {
    fn find_progress(&self, id: ProgressId) -> Result<Option<ProgressRecord>, RepositoryError> {
        (**self).find_progress(id)
    }

    fn insert_progress(&self, record: &ProgressRecord) -> Result<(), RepositoryError> {
        (**self).insert_progress(record)
    }

    fn conditional_update_progress(
        &self,
        record: &ProgressRecord,
        expected_version: u64,
    ) -> Result<u64, RepositoryError> {
        (**self).conditional_update_progress(record, expected_version)
    }

    fn list_completed_progress(&self, user_id: &UserId) -> Result<Vec<ProgressRecord>, RepositoryError> {
        (**self).list_completed_progress(user_id)
    }
}

impl<T: ProgressRepository + ?Sized> ProgressRepository for Arc<T> {
    fn find_progress(&self, id: ProgressId) -> Result<Option<ProgressRecord>, RepositoryError> {
        (**self).find_progress(id)
    }

    fn insert_progress(&self, record: &ProgressRecord) -> Result<(), RepositoryError> {
        (**self).insert_progress(record)
    }

    fn conditional_update_progress(
        &self,
        record: &ProgressRecord,
        expected_version: u64,
    ) -> Result<u64, RepositoryError> {
        (**self).conditional_update_progress(record, expected_version)
    }

    fn list_completed_progress(&self, user_id: &UserId) -> Result<Vec<ProgressRecord>, RepositoryError> {
        (**self).list_completed_progress(user_id)
    }
}

/// Write every graph of a validated catalog into `repo`.
///
/// This is the deployment-time seeding step. Returns the number of graphs written.
pub fn seed_repository<R>(repo: &R, catalog: &ScenarioCatalog) -> Result<usize, RepositoryError>
where
    R: ScenarioRepository + ?Sized,
{
    let mut seeded = 0;
    for graph in catalog.iter() {
        info!(
            graph_id = %graph.id,
            nodes = graph.node_count(),
            max_score = graph.max_possible_score(),
            "seeding scenario"
        );
        repo.insert_graph(graph.clone())?;
        seeded += 1;
    }
    Ok(seeded)
}
