//! Dispatch table from user actions to engine operations.
//!
//! Front ends translate a click, a command-line invocation, or a queued
//! request into an [`Action`] and hand it to
//! [`ProgressEngine::dispatch`]. There is exactly one engine operation per
//! action.

use serde::{Deserialize, Serialize};

use super::ProgressEngine;
use crate::error::EngineError;
use crate::model::mutation::{MutationRequest, Update};
use crate::model::summary::ProgressSummary;
use crate::snapshot::TopicDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Checkbox on any unit; resolved by the leaf rule.
    Check { id: String, completed: bool },
    /// Topic-level override that cascades to every subtopic.
    SetTopic { id: String, completed: bool },
    /// Flip whatever the unit currently shows.
    Toggle { id: String },
    AddTopic { topic: TopicDescriptor },
    AddSubtopic { parent: String, topic: TopicDescriptor },
    Remove { id: String },
}

/// What an action produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Outcome {
    /// A completion write that must be persisted.
    Mutated(Update),
    /// A structural edit; the caller re-saves the whole snapshot.
    Restructured { summary: ProgressSummary },
}

impl Outcome {
    #[must_use]
    pub const fn summary(&self) -> ProgressSummary {
        match self {
            Self::Mutated(update) => update.summary,
            Self::Restructured { summary } => *summary,
        }
    }

    #[must_use]
    pub const fn mutation(&self) -> Option<&MutationRequest> {
        match self {
            Self::Mutated(update) => Some(&update.mutation),
            Self::Restructured { .. } => None,
        }
    }
}

impl ProgressEngine {
    /// Run the engine operation bound to `action`.
    ///
    /// # Errors
    ///
    /// Whatever the bound operation returns.
    pub fn dispatch(&mut self, action: &Action) -> Result<Outcome, EngineError> {
        let outcome = match action {
            Action::Check { id, completed } => {
                Outcome::Mutated(self.set_leaf_completion(id, *completed)?)
            }
            Action::SetTopic { id, completed } => {
                Outcome::Mutated(self.set_topic_completion(id, *completed)?)
            }
            Action::Toggle { id } => Outcome::Mutated(self.toggle(id)?),
            Action::AddTopic { topic } => Outcome::Restructured {
                summary: self.add_topic(topic)?,
            },
            Action::AddSubtopic { parent, topic } => Outcome::Restructured {
                summary: self.add_subtopic(parent, topic)?,
            },
            Action::Remove { id } => Outcome::Restructured {
                summary: self.remove_node(id)?,
            },
        };
        Ok(outcome)
    }
}
