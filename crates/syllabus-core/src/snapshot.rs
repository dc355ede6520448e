//! Wire shapes exchanged with the external topic store.
//!
//! A [`CourseSnapshot`] is the point-in-time representation of a course's
//! topic tree as the store delivers it. The same shape is written back out
//! by [`Tree::to_descriptors`](crate::model::tree::Tree::to_descriptors),
//! so a snapshot can round-trip through the engine unchanged apart from
//! normalization.
//!
//! Field names follow the store's camelCase documents. Older course
//! documents spell the flag `isCompleted`; it is read when `completed` is
//! absent and never written. `scheduled_date` is read as `scheduledDate`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One topic (or subtopic) as supplied by the store.
///
/// Ids are kept as raw strings here; validation happens in
/// [`Tree::build`](crate::model::tree::Tree::build).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireTopic")]
pub struct TopicDescriptor {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    pub completed: bool,
    pub subtopics: Vec<TopicDescriptor>,
}

/// Inbound topic document. Both completion spellings are kept so that a
/// document carrying both can be resolved instead of rejected.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTopic {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "scheduled_date")]
    scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    is_completed: Option<bool>,
    #[serde(default)]
    subtopics: Vec<TopicDescriptor>,
}

impl From<WireTopic> for TopicDescriptor {
    fn from(wire: WireTopic) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            scheduled_date: wire.scheduled_date,
            completed: wire.completed.or(wire.is_completed).unwrap_or(false),
            subtopics: wire.subtopics,
        }
    }
}

impl TopicDescriptor {
    /// A childless, incomplete descriptor.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    #[must_use]
    pub fn with_subtopics(mut self, subtopics: Vec<Self>) -> Self {
        self.subtopics = subtopics;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn scheduled(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    /// Same structure with this unit and every descendant incomplete.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self {
            completed: false,
            subtopics: self.subtopics.iter().map(Self::reset).collect(),
            ..self.clone()
        }
    }
}

/// A full course document: metadata plus its ordered topics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot {
    #[serde(default, alias = "course_id", skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub topics: Vec<TopicDescriptor>,
    /// Ids of removed units. They stay reserved across reloads.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retired: Vec<String>,
}

impl CourseSnapshot {
    /// Parse a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error on malformed input.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error (only possible for
    /// pathological writers).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// A new progress record for this syllabus: same course, same topics,
    /// nothing completed yet. Retired ids stay reserved.
    #[must_use]
    pub fn fresh_progress(&self) -> Self {
        Self {
            topics: self.topics.iter().map(TopicDescriptor::reset).collect(),
            ..self.clone()
        }
    }
}
