//! Nodes and choices - the decision points and scored edges of a graph.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Reserved `next_node_id` value meaning "the run ends here".
pub const TERMINAL_SENTINEL: &str = "END";

/// Where a choice leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    /// The run ends after this choice.
    Terminal,
    /// The run continues at the given node.
    Node(&'a NodeId),
}

/// One scored edge out of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,

    /// Target node, or the terminal sentinel. Absent also ends the run.
    #[serde(default)]
    pub next_node_id: Option<NodeId>,

    /// Points awarded for selecting this choice.
    #[serde(default)]
    pub score_value: u32,

    #[serde(default)]
    pub feedback: Option<String>,

    #[serde(default)]
    pub immediate_consequence: Option<String>,

    /// Only affects feedback phrasing; the engine does not enforce it.
    #[serde(default)]
    pub is_optimal: bool,
}

impl Choice {
    /// Create a choice that ends the run unless a target is set.
    pub fn new(text: impl Into<String>, score_value: u32) -> Self {
        Self {
            text: text.into(),
            next_node_id: None,
            score_value,
            feedback: None,
            immediate_consequence: None,
            is_optimal: false,
        }
    }

    pub fn leading_to(mut self, node_id: impl Into<String>) -> Self {
        self.next_node_id = Some(NodeId::new(node_id));
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_consequence(mut self, consequence: impl Into<String>) -> Self {
        self.immediate_consequence = Some(consequence.into());
        self
    }

    pub fn optimal(mut self) -> Self {
        self.is_optimal = true;
        self
    }

    /// Resolve the sentinel and the absent case into a [`Transition`].
    pub fn transition(&self) -> Transition<'_> {
        match &self.next_node_id {
            Some(id) if !id.is_terminal_sentinel() => Transition::Node(id),
            _ => Transition::Terminal,
        }
    }
}

/// One prompt/decision point in a scenario graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioNode {
    pub id: NodeId,
    pub prompt: String,

    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Terminal nodes end the run on arrival and carry no choices.
    #[serde(default)]
    pub is_terminal: bool,

    /// Shown in the completion summary of a run that ends here.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl ScenarioNode {
    /// A node that asks the user to pick one of `choices`.
    pub fn decision(id: impl Into<String>, prompt: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            id: NodeId::new(id),
            prompt: prompt.into(),
            choices,
            is_terminal: false,
            explanation: None,
        }
    }

    /// A node that ends the run.
    pub fn terminal(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            prompt: prompt.into(),
            choices: Vec::new(),
            is_terminal: true,
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Get the choice at `index`, if it exists.
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    /// Highest score among this node's choices (0 when there are none).
    pub fn best_choice_score(&self) -> u32 {
        self.choices
            .iter()
            .map(|c| c.score_value)
            .max()
            .unwrap_or(0)
    }
}
