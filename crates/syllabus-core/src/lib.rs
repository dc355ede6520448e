//! syllabus-core library.
//!
//! A course is an ordered forest of topics; a topic may hold subtopics to
//! any depth. [`engine::ProgressEngine`] owns the forest and keeps every
//! parent's flag equal to the AND of its children across leaf writes,
//! topic cascades, and structural edits. [`session::Session`] pairs an
//! engine with a [`store::TopicStore`] for persistence and inbound change
//! feeds.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums ([`error::EngineError`],
//!   [`store::StoreError`], [`session::SessionError`]) in the library,
//!   `anyhow::Result` for config loading and at the binary boundary.
//! - **Logging**: `tracing` macros (`debug!` for engine internals, `info!`
//!   for session events, `warn!` for persistence failures).

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod view;

pub use engine::{
    Action, Outcome, ProgressEngine, ToggleRule, build_tree, compute_overall, compute_summary,
};
pub use error::{EngineError, ErrorCode};
pub use model::{
    MutationRequest, Node, NodeId, OverallProgress, ProgressSummary, Scope, Tree, Update,
};
pub use snapshot::{CourseSnapshot, TopicDescriptor};
