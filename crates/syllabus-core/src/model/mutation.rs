use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{node::NodeId, summary::ProgressSummary};

/// Level at which a completion write applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// A single unit; parents are re-rolled from their children.
    Leaf,
    /// A unit and every descendant, overwritten with the same value.
    Topic,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Leaf => "leaf",
            Self::Topic => "topic",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound write describing which node changed and at what level.
///
/// The store persists it; for [`Scope::Topic`] the store is also
/// responsible for cascading the value to its stored subtopic records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationRequest {
    pub id: NodeId,
    pub completed: bool,
    pub scope: Scope,
}

impl MutationRequest {
    #[must_use]
    pub const fn leaf(id: NodeId, completed: bool) -> Self {
        Self {
            id,
            completed,
            scope: Scope::Leaf,
        }
    }

    #[must_use]
    pub const fn topic(id: NodeId, completed: bool) -> Self {
        Self {
            id,
            completed,
            scope: Scope::Topic,
        }
    }
}

/// Result of one engine mutation: what to persist and what to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub mutation: MutationRequest,
    pub summary: ProgressSummary,
}
