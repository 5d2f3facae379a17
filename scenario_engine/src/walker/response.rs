//! Payloads returned to callers of the walker.

use scenario_rules::{OutcomeTier, ProgressId, ProgressRecord, ScenarioGraph, ScenarioNode};
use serde::{Deserialize, Serialize};

/// Result of starting a run: everything a client needs to render the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedRun {
    pub progress_id: ProgressId,
    pub graph: ScenarioGraph,
    /// Same as the graph's start node.
    pub current_node: ScenarioNode,
    pub progress: ProgressRecord,
}

/// The run continues at `current_node`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepContinuation {
    /// Always `false`.
    pub completed: bool,
    pub score: u32,
    pub current_node: ScenarioNode,
    pub feedback: Option<String>,
    pub immediate_consequence: Option<String>,
    pub points_earned: u32,
}

/// The run has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// Always `true`.
    pub completed: bool,
    pub final_score: u32,
    /// Path-independent upper bound; see `scenario_rules::max_possible_score`.
    pub max_possible_score: u32,
    /// Approximate, since the bound may not be reachable on any single path.
    pub final_score_percentage: f64,
    pub outcome_tier: OutcomeTier,
    pub total_xp_earned: u32,
    pub completion_time_seconds: i64,
    pub outcome_message: String,
    pub feedback: Option<String>,
    pub explanatory_text: Option<String>,
    pub points_earned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepResult {
    Continued(StepContinuation),
    Completed(CompletionSummary),
}

impl StepResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepResult::Completed(_))
    }

    /// Points earned by the choice that produced this result.
    pub fn points_earned(&self) -> u32 {
        match self {
            StepResult::Continued(step) => step.points_earned,
            StepResult::Completed(summary) => summary.points_earned,
        }
    }

    pub fn feedback(&self) -> Option<&str> {
        match self {
            StepResult::Continued(step) => step.feedback.as_deref(),
            StepResult::Completed(summary) => summary.feedback.as_deref(),
        }
    }
}
