//! Seed catalogs - the TOML documents scenario graphs are authored in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{GraphError, GraphId, ScenarioGraph};

const BUILTIN_CATALOG: &str = include_str!("../../seeds/default_catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario `{graph}` is malformed: {source}")]
    InvalidGraph {
        graph: GraphId,
        #[source]
        source: GraphError,
    },

    #[error("scenario id `{0}` appears more than once")]
    DuplicateGraph(GraphId),
}

/// A validated set of scenario graphs ready to be seeded into storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    #[serde(default)]
    scenarios: Vec<ScenarioGraph>,
}

impl ScenarioCatalog {
    /// Parse and validate a catalog document.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let catalog: ScenarioCatalog = toml::from_str(source)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from graphs that are already in memory.
    pub fn from_graphs(scenarios: Vec<ScenarioGraph>) -> Result<Self, CatalogError> {
        let catalog = Self { scenarios };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The starter catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut ids = HashSet::new();
        for graph in &self.scenarios {
            graph.validate().map_err(|source| CatalogError::InvalidGraph {
                graph: graph.id.clone(),
                source,
            })?;
            if !ids.insert(&graph.id) {
                return Err(CatalogError::DuplicateGraph(graph.id.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &GraphId) -> Option<&ScenarioGraph> {
        self.scenarios.iter().find(|g| &g.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioGraph> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn into_graphs(self) -> Vec<ScenarioGraph> {
        self.scenarios
    }
}
