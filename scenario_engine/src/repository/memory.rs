//! In-memory repository used by tests and the CLI.

use std::collections::HashMap;

use parking_lot::RwLock;
use scenario_rules::{GraphId, ProgressId, ProgressRecord, ScenarioGraph, UserId};

use super::{ProgressRepository, RepositoryError, ScenarioRepository};

/// Both repositories backed by lock-guarded maps.
///
/// The progress map's write lock makes the version check and the replace a
/// single atomic step.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    graphs: RwLock<HashMap<GraphId, ScenarioGraph>>,
    progress: RwLock<HashMap<ProgressId, ProgressRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a graph outright. Returns the removed graph, if any.
    pub fn remove_graph(&self, id: &GraphId) -> Option<ScenarioGraph> {
        self.graphs.write().remove(id)
    }

    pub fn progress_count(&self) -> usize {
        self.progress.read().len()
    }
}

impl ScenarioRepository for InMemoryRepository {
    fn find_graph(&self, id: &GraphId) -> Result<Option<ScenarioGraph>, RepositoryError> {
        Ok(self.graphs.read().get(id).cloned())
    }

    fn list_graphs(&self) -> Result<Vec<ScenarioGraph>, RepositoryError> {
        Ok(self.graphs.read().values().cloned().collect())
    }

    fn insert_graph(&self, graph: ScenarioGraph) -> Result<(), RepositoryError> {
        let mut graphs = self.graphs.write();
        if graphs.contains_key(&graph.id) {
            return Err(RepositoryError::Duplicate(graph.id.to_string()));
        }
        graphs.insert(graph.id.clone(), graph);
        Ok(())
    }

    fn deactivate_graph(&self, id: &GraphId) -> Result<bool, RepositoryError> {
        match self.graphs.write().get_mut(id) {
            Some(graph) => {
                graph.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl ProgressRepository for InMemoryRepository {
    fn find_progress(&self, id: ProgressId) -> Result<Option<ProgressRecord>, RepositoryError> {
        Ok(self.progress.read().get(&id).cloned())
    }

    fn insert_progress(&self, record: &ProgressRecord) -> Result<(), RepositoryError> {
        let mut progress = self.progress.write();
        if progress.contains_key(&record.id) {
            return Err(RepositoryError::Duplicate(record.id.to_string()));
        }
        progress.insert(record.id, record.clone());
        Ok(())
    }

    fn conditional_update_progress(
        &self,
        record: &ProgressRecord,
        expected_version: u64,
    ) -> Result<u64, RepositoryError> {
        let mut progress = self.progress.write();
        let stored = progress
            .get_mut(&record.id)
            .ok_or(RepositoryError::MissingProgress(record.id))?;

        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }

        let mut updated = record.clone();
        updated.version = expected_version + 1;
        *stored = updated;
        Ok(expected_version + 1)
    }

    fn list_completed_progress(&self, user_id: &UserId) -> Result<Vec<ProgressRecord>, RepositoryError> {
        Ok(self
            .progress
            .read()
            .values()
            .filter(|r| r.completed && &r.user_id == user_id)
            .cloned()
            .collect())
    }
}
