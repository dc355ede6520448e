use std::fmt;

use crate::model::node::NodeId;

/// Machine-readable error codes for front ends that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    NodeNotFound,
    InvalidTarget,
    DuplicateId,
    EmptyId,
    SnapshotParseError,
    SnapshotWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::NodeNotFound => "E2001",
            Self::InvalidTarget => "E2002",
            Self::DuplicateId => "E2003",
            Self::EmptyId => "E2004",
            Self::SnapshotParseError => "E3001",
            Self::SnapshotWriteFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Syllabus not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::NodeNotFound => "Topic not found",
            Self::InvalidTarget => "Topic has subtopics",
            Self::DuplicateId => "Duplicate topic ID",
            Self::EmptyId => "Empty topic ID",
            Self::SnapshotParseError => "Snapshot parse error",
            Self::SnapshotWriteFailed => "Snapshot write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `syl init` to create a snapshot."),
            Self::ConfigParseError => Some("Fix syntax in .syllabus/config.toml and retry."),
            Self::NodeNotFound => Some("Run `syl show` to list topic IDs."),
            Self::InvalidTarget => {
                Some("Use `syl topic <id> --done` to complete a topic and all of its subtopics.")
            }
            Self::DuplicateId => Some("Topic IDs must be unique and are never reused."),
            Self::EmptyId => Some("Give every topic and subtopic a non-empty ID."),
            Self::SnapshotParseError => Some("Check the snapshot file is valid JSON."),
            Self::SnapshotWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the aggregation engine.
///
/// All of these are local and synchronous. The engine never retries; the
/// caller decides whether to surface the error or drop the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The referenced node does not exist in the tree.
    #[error("topic not found: '{id}'")]
    NotFound { id: NodeId },

    /// An id appears twice in a snapshot, or an insert reuses a live or
    /// retired id.
    #[error("duplicate topic id: '{id}'")]
    DuplicateId { id: NodeId },

    /// A leaf write targeted a node with children while the toggle rule is
    /// [`ToggleRule::Reject`](crate::engine::ToggleRule::Reject).
    #[error("'{id}' has {children} subtopic(s) and cannot be set as a single item")]
    InvalidTarget { id: NodeId, children: usize },

    /// A descriptor carried an empty (or whitespace-only) id.
    #[error("empty topic id{}", .parent.as_ref().map_or_else(String::new, |p| format!(" under '{p}'")))]
    EmptyId { parent: Option<NodeId> },
}

impl EngineError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NodeNotFound,
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::InvalidTarget { .. } => ErrorCode::InvalidTarget,
            Self::EmptyId { .. } => ErrorCode::EmptyId,
        }
    }

    /// Remediation hint, falling back to the code's summary.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.code();
        code.hint().unwrap_or(code.message()).to_string()
    }
}
