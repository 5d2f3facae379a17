//! History Projector - a user's completed runs joined with their scenario's metadata.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use scenario_rules::{score_percentage, GraphId, OutcomeTier, ProgressId, ScenarioGraph, UserId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::SimulationError;
use crate::repository::{ProgressRepository, ScenarioRepository};

/// One finished run as shown in a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedRun {
    pub progress_id: ProgressId,
    pub graph_id: GraphId,
    /// `None` when the scenario can no longer be resolved.
    pub title: Option<String>,
    pub category: Option<String>,
    pub score: u32,
    pub max_possible_score: u32,
    pub score_percentage: f64,
    pub outcome_tier: OutcomeTier,
    pub completion_time_seconds: Option<i64>,
    pub completed_at: DateTime<Utc>,
}

/// Read-only view over completed progress records.
pub struct HistoryProjector<R> {
    repo: R,
    config: EngineConfig,
}

impl<R> HistoryProjector<R>
where
    R: ScenarioRepository + ProgressRepository,
{
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    /// Completed runs of `user_id`, newest first, at most `limit` of them.
    ///
    /// A limit of 0 means the configured default. Runs whose scenario has been
    /// deactivated still carry its metadata; runs whose scenario is gone are
    /// listed without a title or category.
    pub fn list_completed_runs(&self, user_id: &UserId, limit: usize) -> Result<Vec<CompletedRun>, SimulationError> {
        let limit = self.config.history_limit(limit);

        let mut records = self.repo.list_completed_progress(user_id)?;
        records.retain(|r| r.completed && &r.user_id == user_id);
        records.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });

        let mut graphs: HashMap<GraphId, Option<ScenarioGraph>> = HashMap::new();
        let mut runs = Vec::with_capacity(limit.min(records.len()));

        for record in records {
            if runs.len() == limit {
                break;
            }

            let Some(completed_at) = record.completed_at else {
                warn!(progress_id = %record.id, "completed record has no completion time, skipping");
                continue;
            };

            let graph = graphs
                .entry(record.graph_id.clone())
                .or_insert_with(|| self.lookup_graph(&record.graph_id));

            let percentage = score_percentage(record.score, record.max_possible_score);
            runs.push(CompletedRun {
                progress_id: record.id,
                graph_id: record.graph_id.clone(),
                title: graph.as_ref().map(|g| g.title.clone()),
                category: graph.as_ref().map(|g| g.category.clone()),
                score: record.score,
                max_possible_score: record.max_possible_score,
                score_percentage: percentage,
                outcome_tier: OutcomeTier::for_score(record.score, record.max_possible_score),
                completion_time_seconds: record.completion_time_seconds,
                completed_at,
            });
        }

        Ok(runs)
    }

    /// Metadata lookups never fail the listing.
    fn lookup_graph(&self, id: &GraphId) -> Option<ScenarioGraph> {
        match self.repo.find_graph(id) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(graph_id = %id, error = %e, "could not resolve scenario for history");
                None
            }
        }
    }
}
