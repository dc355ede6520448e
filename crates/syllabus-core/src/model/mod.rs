//! Completion tree data model.

pub mod mutation;
pub mod node;
pub mod summary;
pub mod tree;

pub use mutation::{MutationRequest, Scope, Update};
pub use node::{Node, NodeId};
pub use summary::{CourseProgress, OverallProgress, ProgressSummary, TopicBreakdown};
pub use tree::{NodePath, Tree};
