//! Load-time structural checks for scenario graphs.

use std::collections::HashSet;

use thiserror::Error;

use super::{NodeId, ScenarioGraph, Transition};

/// Structural defects that make a graph unusable for a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph id is empty")]
    EmptyGraphId,

    #[error("graph has no nodes")]
    NoNodes,

    #[error("a node has an empty id")]
    EmptyNodeId,

    #[error("node id `{0}` appears more than once")]
    DuplicateNode(NodeId),

    #[error("node id `{0}` collides with the terminal marker")]
    ReservedNodeId(NodeId),

    #[error("start node `{0}` is not in the graph")]
    MissingStartNode(NodeId),

    #[error("terminal node `{0}` has choices")]
    TerminalWithChoices(NodeId),

    #[error("node `{0}` is not terminal but has no choices")]
    DecisionWithoutChoices(NodeId),

    #[error("choice {choice_index} of node `{node}` points to missing node `{target}`")]
    DanglingEdge {
        node: NodeId,
        choice_index: usize,
        target: NodeId,
    },

    #[error("summed best choices exceed the score range")]
    ScoreOverflow,
}

impl ScenarioGraph {
    /// Check every structural invariant, returning the first defect found.
    ///
    /// A graph that passes can be walked without hitting a missing node.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.id.as_str().trim().is_empty() {
            return Err(GraphError::EmptyGraphId);
        }
        if self.nodes.is_empty() {
            return Err(GraphError::NoNodes);
        }

        let mut seen: HashSet<&NodeId> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id.as_str().trim().is_empty() {
                return Err(GraphError::EmptyNodeId);
            }
            if node.id.is_terminal_sentinel() {
                return Err(GraphError::ReservedNodeId(node.id.clone()));
            }
            if !seen.insert(&node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        if !seen.contains(&self.start_node_id) {
            return Err(GraphError::MissingStartNode(self.start_node_id.clone()));
        }

        for node in &self.nodes {
            match (node.is_terminal, node.choices.is_empty()) {
                (true, false) => return Err(GraphError::TerminalWithChoices(node.id.clone())),
                (false, true) => return Err(GraphError::DecisionWithoutChoices(node.id.clone())),
                _ => {}
            }

            for (index, choice) in node.choices.iter().enumerate() {
                if let Transition::Node(target) = choice.transition() {
                    if !seen.contains(target) {
                        return Err(GraphError::DanglingEdge {
                            node: node.id.clone(),
                            choice_index: index,
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        if self.checked_max_possible_score().is_none() {
            return Err(GraphError::ScoreOverflow);
        }

        Ok(())
    }
}
