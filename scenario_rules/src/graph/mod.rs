//! Scenario graphs - immutable templates describing one branching narrative.

mod node;
mod validation;

pub use node::*;
pub use validation::*;

use serde::{Deserialize, Serialize};

/// Identifier of a scenario graph, assigned by the seed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(pub String);

impl GraphId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a node. Unique within its graph only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id is the reserved terminal marker.
    pub fn is_terminal_sentinel(&self) -> bool {
        self.0 == TERMINAL_SENTINEL
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presentational difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

fn default_active() -> bool {
    true
}

/// A complete scenario: presentational metadata plus an ordered set of nodes.
///
/// Graphs are created by the seeding process and are read-only afterwards.
/// Deactivation hides a graph from new runs without touching runs in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGraph {
    pub id: GraphId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub start_node_id: NodeId,
    pub nodes: Vec<ScenarioNode>,

    /// Inactive graphs cannot be started.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ScenarioGraph {
    /// Create an empty graph. Nodes are added with [`ScenarioGraph::with_node`].
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        start_node_id: impl Into<String>,
    ) -> Self {
        Self {
            id: GraphId::new(id),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            difficulty: Difficulty::default(),
            start_node_id: NodeId::new(start_node_id),
            nodes: Vec::new(),
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_node(mut self, node: ScenarioNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&ScenarioNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// The node every run starts at.
    pub fn start_node(&self) -> Option<&ScenarioNode> {
        self.node(&self.start_node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes that still ask the user for a decision.
    pub fn decision_nodes(&self) -> impl Iterator<Item = &ScenarioNode> {
        self.nodes.iter().filter(|n| !n.is_terminal)
    }
}
