//! Graph Walker - starts runs and moves them through their scenario graph.
//!
//! A run is a small state machine: `Active(node)` until a choice ends it, then
//! `Completed` for good. Each call loads the persisted record, validates the
//! request against the graph, and writes the new state back with a
//! compare-and-swap on the record's version. Nothing is written unless every
//! check has passed.

mod response;

pub use response::*;

use scenario_rules::{
    score_percentage, Choice, GraphId, OutcomeTier, ProgressId, ProgressRecord, RunState,
    ScenarioGraph, ScenarioNode, Transition, UserId,
};
use tracing::{debug, error, info, warn};

use crate::capabilities::{Clock, XpLedger};
use crate::config::EngineConfig;
use crate::error::SimulationError;
use crate::repository::{ProgressRepository, ScenarioRepository};

/// Where an accepted choice takes the run.
#[derive(Clone, Copy)]
enum Step<'g> {
    Continue(&'g ScenarioNode),
    /// Ends the run at this node: the terminal node the choice led into, or
    /// the node the choice was made at when it pointed at the sentinel.
    Finish(&'g ScenarioNode),
}

/// The engine core. Holds no per-run state of its own.
pub struct GraphWalker<R, X, C> {
    repo: R,
    xp: X,
    clock: C,
    config: EngineConfig,
}

impl<R, X, C> GraphWalker<R, X, C>
where
    R: ScenarioRepository + ProgressRepository,
    X: XpLedger,
    C: Clock,
{
    pub fn new(repo: R, xp: X, clock: C, config: EngineConfig) -> Self {
        Self {
            repo,
            xp,
            clock,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn xp_ledger(&self) -> &X {
        &self.xp
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new run of `graph_id` for `user_id` at the graph's start node.
    pub fn start_run(&self, graph_id: &GraphId, user_id: &UserId) -> Result<StartedRun, SimulationError> {
        let graph = self
            .repo
            .find_graph(graph_id)?
            .filter(|g| g.active)
            .ok_or_else(|| SimulationError::graph_not_found(graph_id))?;

        let start = graph.start_node().cloned().ok_or_else(|| {
            error!(graph_id = %graph.id, start = %graph.start_node_id, "start node missing from graph");
            SimulationError::InternalConsistency(format!(
                "start node `{}` is missing from scenario `{}`",
                graph.start_node_id, graph.id
            ))
        })?;

        let record = ProgressRecord::start(user_id.clone(), &graph, self.clock.now());
        self.repo.insert_progress(&record)?;

        info!(
            progress_id = %record.id,
            user_id = %user_id,
            graph_id = %graph.id,
            max_score = record.max_possible_score,
            "run started"
        );

        Ok(StartedRun {
            progress_id: record.id,
            graph,
            current_node: start,
            progress: record,
        })
    }

    /// Fetch a run for its owner. Runs owned by someone else read as missing.
    pub fn get_progress(&self, progress_id: ProgressId, user_id: &UserId) -> Result<ProgressRecord, SimulationError> {
        let record = self
            .repo
            .find_progress(progress_id)?
            .ok_or_else(|| SimulationError::progress_not_found(progress_id))?;

        if !record.is_owned_by(user_id) {
            debug!(progress_id = %progress_id, user_id = %user_id, "progress requested by non-owner");
            return Err(SimulationError::progress_not_found(progress_id));
        }

        record.check_integrity().map_err(|e| {
            error!(progress_id = %progress_id, error = %e, "stored progress record is inconsistent");
            SimulationError::InternalConsistency(format!("progress record `{}`: {}", progress_id, e))
        })?;

        Ok(record)
    }

    /// Apply the user's choice at the run's current node.
    pub fn submit_choice(
        &self,
        progress_id: ProgressId,
        user_id: &UserId,
        choice_index: usize,
    ) -> Result<StepResult, SimulationError> {
        let mut record = self.get_progress(progress_id, user_id)?;

        let current_id = match record.state() {
            RunState::Completed => return Err(SimulationError::InvalidState(progress_id)),
            RunState::Active(node_id) => node_id.clone(),
        };

        let graph = self
            .repo
            .find_graph(&record.graph_id)?
            .ok_or_else(|| SimulationError::graph_not_found(&record.graph_id))?;

        let node = graph.node(&current_id).ok_or_else(|| {
            error!(
                progress_id = %progress_id,
                graph_id = %graph.id,
                node_id = %current_id,
                "current node missing from its own graph"
            );
            SimulationError::InternalConsistency(format!(
                "node `{}` is not part of scenario `{}`",
                current_id, graph.id
            ))
        })?;

        let choice = node.choice(choice_index).ok_or_else(|| {
            SimulationError::Validation(format!(
                "choice index {} is out of range for node `{}` ({} choices)",
                choice_index,
                node.id,
                node.choices.len()
            ))
        })?;

        let step = resolve_step(&graph, node, choice_index, choice)?;

        let now = self.clock.now();
        let expected_version = record.version;
        record.record_choice(choice_index, choice, now);
        match step {
            Step::Continue(next) => record.advance_to(next.id.clone()),
            Step::Finish(at) => {
                record.advance_to(at.id.clone());
                record.complete(now);
            }
        }

        record.version = self
            .repo
            .conditional_update_progress(&record, expected_version)
            .map_err(|e| {
                warn!(progress_id = %progress_id, error = %e, "progress write rejected");
                SimulationError::from(e)
            })?;

        match step {
            Step::Continue(next) => {
                debug!(
                    progress_id = %progress_id,
                    from = %node.id,
                    to = %next.id,
                    points = choice.score_value,
                    score = record.score,
                    "choice accepted"
                );
                Ok(StepResult::Continued(StepContinuation {
                    completed: false,
                    score: record.score,
                    current_node: next.clone(),
                    feedback: choice.feedback.clone(),
                    immediate_consequence: choice.immediate_consequence.clone(),
                    points_earned: choice.score_value,
                }))
            }
            Step::Finish(at) => Ok(StepResult::Completed(self.finish_run(&record, &graph, at, choice))),
        }
    }

    /// Build the summary for a run that was just persisted as completed, and award XP.
    fn finish_run(
        &self,
        record: &ProgressRecord,
        graph: &ScenarioGraph,
        final_node: &ScenarioNode,
        last_choice: &Choice,
    ) -> CompletionSummary {
        let percentage = score_percentage(record.score, record.max_possible_score);
        let tier = OutcomeTier::for_score(record.score, record.max_possible_score);

        info!(
            progress_id = %record.id,
            user_id = %record.user_id,
            graph_id = %graph.id,
            score = record.score,
            max_score = record.max_possible_score,
            percentage,
            tier = %tier,
            "run completed"
        );

        if let Err(e) = self
            .xp
            .award(&record.user_id, record.score, &self.config.xp_reason_tag)
        {
            warn!(
                progress_id = %record.id,
                user_id = %record.user_id,
                amount = record.score,
                reason = %self.config.xp_reason_tag,
                error = %e,
                "xp award failed; completion stands, needs reconciliation"
            );
        }

        CompletionSummary {
            completed: true,
            final_score: record.score,
            max_possible_score: record.max_possible_score,
            final_score_percentage: percentage,
            outcome_tier: tier,
            total_xp_earned: record.score,
            completion_time_seconds: record.completion_time_seconds.unwrap_or(0),
            outcome_message: tier.message(&graph.category),
            feedback: last_choice.feedback.clone(),
            explanatory_text: final_node.explanation.clone(),
            points_earned: last_choice.score_value,
        }
    }
}

/// Work out where `choice` leads before anything is mutated.
fn resolve_step<'g>(
    graph: &'g ScenarioGraph,
    node: &'g ScenarioNode,
    choice_index: usize,
    choice: &Choice,
) -> Result<Step<'g>, SimulationError> {
    match choice.transition() {
        Transition::Terminal => Ok(Step::Finish(node)),
        Transition::Node(target) => {
            let next = graph.node(target).ok_or_else(|| {
                error!(
                    graph_id = %graph.id,
                    node_id = %node.id,
                    choice_index,
                    target = %target,
                    "data integrity: choice points to a node missing from the graph"
                );
                SimulationError::Validation(format!(
                    "choice {} of node `{}` leads to unknown node `{}`",
                    choice_index, node.id, target
                ))
            })?;
            if next.is_terminal {
                Ok(Step::Finish(next))
            } else {
                Ok(Step::Continue(next))
            }
        }
    }
}
