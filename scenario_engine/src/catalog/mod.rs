//! Read path over the scenarios users can start.

use scenario_rules::{Difficulty, GraphId, ScenarioGraph};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::repository::ScenarioRepository;

/// Listing entry for one startable scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: GraphId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub node_count: usize,
    pub max_possible_score: u32,
}

impl From<&ScenarioGraph> for ScenarioSummary {
    fn from(graph: &ScenarioGraph) -> Self {
        Self {
            id: graph.id.clone(),
            title: graph.title.clone(),
            description: graph.description.clone(),
            category: graph.category.clone(),
            difficulty: graph.difficulty,
            node_count: graph.node_count(),
            max_possible_score: graph.max_possible_score(),
        }
    }
}

pub struct ScenarioCatalogView<R> {
    repo: R,
}

impl<R: ScenarioRepository> ScenarioCatalogView<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Active scenarios sorted by title, optionally narrowed to one category.
    pub fn list_scenarios(&self, category: Option<&str>) -> Result<Vec<ScenarioSummary>, SimulationError> {
        let mut summaries: Vec<ScenarioSummary> = self
            .repo
            .list_graphs()?
            .iter()
            .filter(|g| g.active)
            .filter(|g| category.map_or(true, |c| g.category.eq_ignore_ascii_case(c)))
            .map(ScenarioSummary::from)
            .collect();

        summaries.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    /// The full graph of an active scenario.
    pub fn get_scenario(&self, id: &GraphId) -> Result<ScenarioGraph, SimulationError> {
        self.repo
            .find_graph(id)?
            .filter(|g| g.active)
            .ok_or_else(|| SimulationError::graph_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::{seed_repository, InMemoryRepository};
    use scenario_rules::ScenarioCatalog;

    fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        seed_repository(&repo, &ScenarioCatalog::builtin().unwrap()).unwrap();
        repo
    }

    #[test]
    fn test_list_scenarios_sorted() {
        let repo = seeded();
        let view = ScenarioCatalogView::new(&repo);

        let all = view.list_scenarios(None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.windows(2).all(|w| w[0].title <= w[1].title));
        assert!(all.iter().all(|s| s.max_possible_score > 0));
    }

    #[test]
    fn test_category_filter_ignores_case() {
        let repo = seeded();
        let view = ScenarioCatalogView::new(&repo);

        let fire = view.list_scenarios(Some("fire safety")).unwrap();
        assert_eq!(fire.len(), 1);
        assert_eq!(fire[0].id, GraphId::new("grease-fire"));

        assert!(view.list_scenarios(Some("Cooking")).unwrap().is_empty());
    }

    #[test]
    fn test_deactivated_scenarios_are_hidden() {
        let repo = seeded();
        repo.deactivate_graph(&GraphId::new("grease-fire")).unwrap();
        let view = ScenarioCatalogView::new(&repo);

        assert_eq!(view.list_scenarios(None).unwrap().len(), 1);
        let err = view.get_scenario(&GraphId::new("grease-fire")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let graph = view.get_scenario(&GraphId::new("suspicious-email")).unwrap();
        assert_eq!(graph.title, "The Urgent Invoice");
    }
}
