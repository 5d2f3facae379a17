//! Score normalisation: the max-score bound, percentages and outcome tiers.

use serde::{Deserialize, Serialize};

use crate::graph::ScenarioGraph;

/// Upper bound on the score a run of `graph` can reach.
///
/// Sums each decision node's best choice across the whole graph, whether or
/// not all of those nodes lie on one path. On branching graphs this
/// overestimates the best reachable score, so percentages derived from it are
/// approximate and never an exact "best possible path" figure.
///
/// Saturates rather than overflowing. Graphs whose bound overflows fail
/// [`ScenarioGraph::validate`].
pub fn max_possible_score(graph: &ScenarioGraph) -> u32 {
    graph
        .decision_nodes()
        .fold(0u32, |total, n| total.saturating_add(n.best_choice_score()))
}

/// The bound, or `None` when it does not fit in a `u32`.
pub fn checked_max_possible_score(graph: &ScenarioGraph) -> Option<u32> {
    graph
        .decision_nodes()
        .try_fold(0u32, |total, n| total.checked_add(n.best_choice_score()))
}

/// Unrounded `100 * score / max`, clamped to `0..=100`. Tiers are cut from this.
///
/// A zero bound yields 0 rather than dividing by zero.
pub fn raw_score_percentage(score: u32, max_possible_score: u32) -> f64 {
    if max_possible_score == 0 {
        return 0.0;
    }
    (100.0 * f64::from(score) / f64::from(max_possible_score)).clamp(0.0, 100.0)
}

/// [`raw_score_percentage`] rounded to one decimal, for display.
pub fn score_percentage(score: u32, max_possible_score: u32) -> f64 {
    (raw_score_percentage(score, max_possible_score) * 10.0).round() / 10.0
}

impl ScenarioGraph {
    /// See [`max_possible_score`].
    pub fn max_possible_score(&self) -> u32 {
        max_possible_score(self)
    }

    pub fn checked_max_possible_score(&self) -> Option<u32> {
        checked_max_possible_score(self)
    }
}

/// Qualitative outcome of a finished run, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTier {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl OutcomeTier {
    /// Bucket a percentage: 90+, 75+, 60+, below 60.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => OutcomeTier::Excellent,
            p if p >= 75.0 => OutcomeTier::Good,
            p if p >= 60.0 => OutcomeTier::Fair,
            _ => OutcomeTier::NeedsWork,
        }
    }

    /// Tier of a finished run, cut from the unrounded percentage.
    pub fn for_score(score: u32, max_possible_score: u32) -> Self {
        Self::from_percentage(raw_score_percentage(score, max_possible_score))
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeTier::Excellent => "Excellent",
            OutcomeTier::Good => "Good",
            OutcomeTier::Fair => "Fair",
            OutcomeTier::NeedsWork => "Needs Work",
        }
    }

    /// The fixed outcome message for this tier, naming the scenario's category.
    pub fn message(&self, category: &str) -> String {
        match self {
            OutcomeTier::Excellent => format!(
                "Outstanding! You handled this {} scenario with expert judgment.",
                category
            ),
            OutcomeTier::Good => format!(
                "Well done. You showed solid {} awareness, with room to sharpen a few decisions.",
                category
            ),
            OutcomeTier::Fair => format!(
                "Not bad. You know the basics of {}, but some choices could have gone better.",
                category
            ),
            OutcomeTier::NeedsWork => format!(
                "This {} scenario was a tough one. Review the feedback and try again.",
                category
            ),
        }
    }
}

impl std::fmt::Display for OutcomeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Choice, ScenarioNode};

    #[test]
    fn test_max_score_sums_best_choices() {
        let graph = ScenarioGraph::new("g", "Graph", "Safety", "a")
            .with_node(ScenarioNode::decision(
                "a",
                "A",
                vec![Choice::new("safe", 10).leading_to("b"), Choice::new("risky", 2)],
            ))
            .with_node(ScenarioNode::decision("b", "B", vec![Choice::new("finish", 20)]))
            .with_node(ScenarioNode::terminal("c", "C"));

        assert_eq!(max_possible_score(&graph), 30);
        assert_eq!(graph.max_possible_score(), 30);
    }

    #[test]
    fn test_max_score_counts_unreachable_branches() {
        // Both branches count even though a run visits only one of them.
        let graph = ScenarioGraph::new("g", "Graph", "Safety", "a")
            .with_node(ScenarioNode::decision(
                "a",
                "A",
                vec![Choice::new("left", 1).leading_to("l"), Choice::new("right", 1).leading_to("r")],
            ))
            .with_node(ScenarioNode::decision("l", "L", vec![Choice::new("x", 5)]))
            .with_node(ScenarioNode::decision("r", "R", vec![Choice::new("y", 7)]));

        assert_eq!(max_possible_score(&graph), 13);
    }

    #[test]
    fn test_max_score_empty_decision_node() {
        let graph = ScenarioGraph::new("g", "Graph", "Safety", "a")
            .with_node(ScenarioNode::decision("a", "A", Vec::new()));
        assert_eq!(max_possible_score(&graph), 0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(score_percentage(30, 30), 100.0);
        assert_eq!(score_percentage(2, 30), 6.7);
        assert_eq!(score_percentage(0, 0), 0.0);
        assert_eq!(score_percentage(15, 0), 0.0);
        assert_eq!(score_percentage(45, 30), 100.0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(OutcomeTier::from_percentage(100.0), OutcomeTier::Excellent);
        assert_eq!(OutcomeTier::from_percentage(90.0), OutcomeTier::Excellent);
        assert_eq!(OutcomeTier::from_percentage(89.9), OutcomeTier::Good);
        assert_eq!(OutcomeTier::from_percentage(75.0), OutcomeTier::Good);
        assert_eq!(OutcomeTier::from_percentage(74.9), OutcomeTier::Fair);
        assert_eq!(OutcomeTier::from_percentage(60.0), OutcomeTier::Fair);
        assert_eq!(OutcomeTier::from_percentage(59.9), OutcomeTier::NeedsWork);
        assert_eq!(OutcomeTier::from_percentage(0.0), OutcomeTier::NeedsWork);
    }

    #[test]
    fn test_max_score_overflow() {
        let graph = ScenarioGraph::new("g", "Graph", "Safety", "a")
            .with_node(ScenarioNode::decision(
                "a",
                "A",
                vec![Choice::new("huge", u32::MAX).leading_to("b")],
            ))
            .with_node(ScenarioNode::decision("b", "B", vec![Choice::new("one", 1)]));

        assert_eq!(checked_max_possible_score(&graph), None);
        assert_eq!(max_possible_score(&graph), u32::MAX);
    }

    #[test]
    fn test_tier_uses_unrounded_percentage() {
        // 89.95, 74.95 and 59.95 would each round up onto the next threshold.
        assert_eq!(OutcomeTier::for_score(1799, 2000), OutcomeTier::Good);
        assert_eq!(OutcomeTier::for_score(1499, 2000), OutcomeTier::Fair);
        assert_eq!(OutcomeTier::for_score(1199, 2000), OutcomeTier::NeedsWork);

        assert_eq!(OutcomeTier::for_score(1800, 2000), OutcomeTier::Excellent);
        assert_eq!(OutcomeTier::for_score(1500, 2000), OutcomeTier::Good);
        assert_eq!(OutcomeTier::for_score(1200, 2000), OutcomeTier::Fair);
        assert_eq!(OutcomeTier::for_score(0, 0), OutcomeTier::NeedsWork);

        assert!(raw_score_percentage(1799, 2000) < 90.0);
        assert_eq!(raw_score_percentage(45, 30), 100.0);
    }

    #[test]
    fn test_tier_ordering_and_message() {
        assert!(OutcomeTier::Excellent < OutcomeTier::NeedsWork);
        assert!(OutcomeTier::Good.message("Fire Safety").contains("Fire Safety"));
        assert_eq!(OutcomeTier::NeedsWork.to_string(), "Needs Work");
    }
}
