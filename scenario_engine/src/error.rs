//! Engine error taxonomy.

use scenario_rules::ProgressId;
use thiserror::Error;

use crate::repository::RepositoryError;

/// Coarse classification of a [`SimulationError`], for transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    InvalidState,
    Conflict,
    InternalConsistency,
    Storage,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    /// A graph or progress record is absent (or not visible to the caller).
    #[error("{what} `{id}` not found")]
    NotFound { what: &'static str, id: String },

    /// The request or the graph it touches is malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A choice was submitted against a run that has already finished.
    #[error("run `{0}` is already completed")]
    InvalidState(ProgressId),

    /// Another write to the same record won the race. Re-read and retry.
    #[error("progress record was modified concurrently (expected version {expected}, found {found})")]
    Conflict { expected: u64, found: u64 },

    /// A record and its graph disagree. Never retried automatically.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl SimulationError {
    pub fn graph_not_found(id: impl std::fmt::Display) -> Self {
        SimulationError::NotFound {
            what: "scenario",
            id: id.to_string(),
        }
    }

    pub fn progress_not_found(id: ProgressId) -> Self {
        SimulationError::NotFound {
            what: "progress record",
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SimulationError::NotFound { .. } => ErrorKind::NotFound,
            SimulationError::Validation(_) => ErrorKind::Validation,
            SimulationError::InvalidState(_) => ErrorKind::InvalidState,
            SimulationError::Conflict { .. } => ErrorKind::Conflict,
            SimulationError::InternalConsistency(_) => ErrorKind::InternalConsistency,
            SimulationError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// HTTP-style status for the transport layer.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::InvalidState | ErrorKind::Conflict => 409,
            ErrorKind::InternalConsistency => 500,
            ErrorKind::Storage => 503,
        }
    }

    /// Whether the client may safely retry after re-reading its progress.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::Storage)
    }
}

impl From<RepositoryError> for SimulationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::VersionConflict { expected, found } => {
                SimulationError::Conflict { expected, found }
            }
            RepositoryError::MissingProgress(id) => SimulationError::progress_not_found(id),
            other => SimulationError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SimulationError::graph_not_found("g").status_code(), 404);
        assert_eq!(SimulationError::Validation("bad".into()).status_code(), 400);
        assert_eq!(SimulationError::InvalidState(ProgressId::new()).status_code(), 409);
        assert_eq!(
            SimulationError::Conflict {
                expected: 1,
                found: 2
            }
            .status_code(),
            409
        );
        assert_eq!(SimulationError::InternalConsistency("x".into()).status_code(), 500);
        assert_eq!(SimulationError::Storage("down".into()).status_code(), 503);
    }

    #[test]
    fn test_retryable() {
        assert!(SimulationError::Conflict {
            expected: 0,
            found: 1
        }
        .is_retryable());
        assert!(!SimulationError::InternalConsistency("x".into()).is_retryable());
        assert!(!SimulationError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn test_from_repository_error() {
        let conflict: SimulationError = RepositoryError::VersionConflict {
            expected: 3,
            found: 4,
        }
        .into();
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let missing: SimulationError = RepositoryError::MissingProgress(ProgressId::new()).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let backend: SimulationError = RepositoryError::Backend("disk full".into()).into();
        assert_eq!(backend.kind(), ErrorKind::Storage);
        assert!(backend.to_string().contains("disk full"));
    }
}
