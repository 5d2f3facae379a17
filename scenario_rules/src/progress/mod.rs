//! Progress records - the persisted state of one user's run through a graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::graph::{Choice, GraphId, NodeId, ScenarioGraph};

/// Unique identifier for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressId(pub Uuid);

impl ProgressId {
    /// Create a new random progress ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ProgressId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProgressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProgressId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identity of a user, as issued by the external identity system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One submitted choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    pub node_id: NodeId,
    pub choice_index: usize,
    pub choice_text: String,
    pub points_earned: u32,
    pub timestamp: DateTime<Utc>,
}

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState<'a> {
    Active(&'a NodeId),
    Completed,
}

/// Ways a stored record can contradict itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("score {recorded} does not match path total {computed}")]
    ScoreMismatch { recorded: u32, computed: u32 },

    #[error("completion flag and completion timestamps disagree")]
    CompletionMismatch,

    #[error("path entry {0} is timestamped before the run started")]
    EntryBeforeStart(usize),
}

/// State of one in-flight or finished run.
///
/// `path_taken` only grows, `score` always equals the sum of its
/// `points_earned`, and a completed record is never modified again.
/// `version` is bumped by the repository on every accepted write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub user_id: UserId,
    pub graph_id: GraphId,
    pub current_node_id: NodeId,
    pub path_taken: Vec<PathEntry>,
    pub score: u32,

    /// Computed once when the run starts.
    pub max_possible_score: u32,

    pub completed: bool,
    pub completion_time_seconds: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub version: u64,
}

impl ProgressRecord {
    /// Begin a run at the graph's start node.
    pub fn start(user_id: UserId, graph: &ScenarioGraph, now: DateTime<Utc>) -> Self {
        Self {
            id: ProgressId::new(),
            user_id,
            graph_id: graph.id.clone(),
            current_node_id: graph.start_node_id.clone(),
            path_taken: Vec::new(),
            score: 0,
            max_possible_score: graph.max_possible_score(),
            completed: false,
            completion_time_seconds: None,
            started_at: now,
            completed_at: None,
            version: 0,
        }
    }

    pub fn state(&self) -> RunState<'_> {
        if self.completed {
            RunState::Completed
        } else {
            RunState::Active(&self.current_node_id)
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Append a path entry for `choice` taken at the current node and add its points.
    ///
    /// A clock that has stepped backwards is clamped so entries never precede
    /// the run's start or the entry before them. The score saturates.
    pub fn record_choice(&mut self, choice_index: usize, choice: &Choice, now: DateTime<Utc>) {
        let timestamp = self.not_before_last_step(now);
        self.path_taken.push(PathEntry {
            node_id: self.current_node_id.clone(),
            choice_index,
            choice_text: choice.text.clone(),
            points_earned: choice.score_value,
            timestamp,
        });
        self.score = self.score.saturating_add(choice.score_value);
    }

    fn not_before_last_step(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.last_entry().map_or(self.started_at, |e| e.timestamp.max(self.started_at));
        now.max(floor)
    }

    pub fn advance_to(&mut self, node_id: NodeId) {
        self.current_node_id = node_id;
    }

    /// Mark the run finished. `current_node_id` is left on the last visited node.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        let now = self.not_before_last_step(now);
        self.completed = true;
        self.completed_at = Some(now);
        self.completion_time_seconds = Some((now - self.started_at).num_seconds());
    }

    pub fn last_entry(&self) -> Option<&PathEntry> {
        self.path_taken.last()
    }

    /// Sum of `points_earned` across the path, saturating like `score`.
    pub fn path_total(&self) -> u32 {
        self.path_taken
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.points_earned))
    }

    /// Reject records whose fields contradict each other.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let computed = self.path_total();
        if computed != self.score {
            return Err(IntegrityError::ScoreMismatch {
                recorded: self.score,
                computed,
            });
        }

        let stamped = self.completed_at.is_some() && self.completion_time_seconds.is_some();
        let unstamped = self.completed_at.is_none() && self.completion_time_seconds.is_none();
        if (self.completed && !stamped) || (!self.completed && !unstamped) {
            return Err(IntegrityError::CompletionMismatch);
        }

        if let Some(index) = self
            .path_taken
            .iter()
            .position(|e| e.timestamp < self.started_at)
        {
            return Err(IntegrityError::EntryBeforeStart(index));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ScenarioNode;
    use chrono::{Duration, TimeZone};

    fn graph() -> ScenarioGraph {
        ScenarioGraph::new("g", "Graph", "Safety", "a")
            .with_node(ScenarioNode::decision(
                "a",
                "Start",
                vec![Choice::new("on", 4).leading_to("b"), Choice::new("off", 1)],
            ))
            .with_node(ScenarioNode::decision("b", "Next", vec![Choice::new("done", 6)]))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_start_record() {
        let record = ProgressRecord::start(UserId::new("u1"), &graph(), t0());

        assert_eq!(record.current_node_id, NodeId::new("a"));
        assert!(record.path_taken.is_empty());
        assert_eq!(record.score, 0);
        assert_eq!(record.max_possible_score, 10);
        assert_eq!(record.version, 0);
        assert_eq!(record.state(), RunState::Active(&NodeId::new("a")));
    }

    #[test]
    fn test_record_choice_and_complete() {
        let graph = graph();
        let mut record = ProgressRecord::start(UserId::new("u1"), &graph, t0());

        let choice = graph.node(&NodeId::new("a")).unwrap().choice(0).unwrap();
        record.record_choice(0, choice, t0() + Duration::seconds(5));
        record.advance_to(NodeId::new("b"));

        assert_eq!(record.score, 4);
        assert_eq!(record.last_entry().unwrap().node_id, NodeId::new("a"));
        assert_eq!(record.last_entry().unwrap().choice_text, "on");

        record.complete(t0() + Duration::seconds(42));
        assert_eq!(record.state(), RunState::Completed);
        assert_eq!(record.completion_time_seconds, Some(42));
        assert_eq!(record.current_node_id, NodeId::new("b"));
        assert_eq!(record.check_integrity(), Ok(()));
    }

    #[test]
    fn test_integrity_score_mismatch() {
        let mut record = ProgressRecord::start(UserId::new("u1"), &graph(), t0());
        record.score = 99;

        assert_eq!(
            record.check_integrity(),
            Err(IntegrityError::ScoreMismatch {
                recorded: 99,
                computed: 0
            })
        );
    }

    #[test]
    fn test_integrity_completion_flags() {
        let mut record = ProgressRecord::start(UserId::new("u1"), &graph(), t0());
        record.completed = true;
        assert_eq!(record.check_integrity(), Err(IntegrityError::CompletionMismatch));

        let mut record = ProgressRecord::start(UserId::new("u1"), &graph(), t0());
        record.completed_at = Some(t0());
        assert_eq!(record.check_integrity(), Err(IntegrityError::CompletionMismatch));
    }

    #[test]
    fn test_integrity_entry_before_start() {
        let graph = graph();
        let mut record = ProgressRecord::start(UserId::new("u1"), &graph, t0());
        let choice = graph.node(&NodeId::new("a")).unwrap().choice(1).unwrap();
        record.record_choice(1, choice, t0());
        record.path_taken[0].timestamp = t0() - Duration::seconds(1);

        assert_eq!(record.check_integrity(), Err(IntegrityError::EntryBeforeStart(0)));
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let graph = graph();
        let mut record = ProgressRecord::start(UserId::new("u1"), &graph, t0());

        let on = graph.node(&NodeId::new("a")).unwrap().choice(0).unwrap();
        record.record_choice(0, on, t0() + Duration::seconds(8));
        record.advance_to(NodeId::new("b"));

        let done = graph.node(&NodeId::new("b")).unwrap().choice(0).unwrap();
        record.record_choice(0, done, t0() - Duration::seconds(3));
        record.complete(t0() - Duration::seconds(3));

        assert_eq!(record.path_taken[1].timestamp, t0() + Duration::seconds(8));
        assert_eq!(record.completed_at, Some(t0() + Duration::seconds(8)));
        assert_eq!(record.completion_time_seconds, Some(8));
        assert_eq!(record.check_integrity(), Ok(()));
    }

    #[test]
    fn test_score_saturates() {
        let graph = ScenarioGraph::new("g", "Graph", "Safety", "a").with_node(ScenarioNode::decision(
            "a",
            "Loop",
            vec![Choice::new("again", u32::MAX).leading_to("a")],
        ));
        let mut record = ProgressRecord::start(UserId::new("u1"), &graph, t0());
        assert_eq!(record.max_possible_score, u32::MAX);

        let choice = graph.node(&NodeId::new("a")).unwrap().choice(0).unwrap();
        record.record_choice(0, choice, t0());
        record.record_choice(0, choice, t0());

        assert_eq!(record.score, u32::MAX);
        assert_eq!(record.check_integrity(), Ok(()));
    }

    #[test]
    fn test_ownership() {
        let record = ProgressRecord::start(UserId::new("u1"), &graph(), t0());
        assert!(record.is_owned_by(&UserId::new("u1")));
        assert!(!record.is_owned_by(&UserId::new("u2")));
    }

    #[test]
    fn test_progress_id_parse() {
        let id = ProgressId::new();
        let parsed: ProgressId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(ProgressId::from_uuid(id.0), id);
        assert!("not-a-uuid".parse::<ProgressId>().is_err());
    }
}
