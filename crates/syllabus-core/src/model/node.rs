use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};

/// Opaque, stable identifier of a topic or subtopic.
///
/// Ids are trimmed on construction and never empty. They are immutable
/// once a node exists and are never handed out twice within one tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build an id from raw input, returning `None` when it trims to empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Wrap a string that is already known to be a valid id.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One syllabus unit: a topic, or a subtopic nested under one.
///
/// Fields are read-only outside the crate. Every write goes through
/// [`ProgressEngine`](crate::engine::ProgressEngine) so that a parent's
/// flag always equals the AND of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    title: String,
    description: Option<String>,
    scheduled_date: Option<NaiveDate>,
    completed: bool,
    children: Vec<Node>,
}

impl Node {
    pub(crate) const fn new(
        id: NodeId,
        title: String,
        description: Option<String>,
        scheduled_date: Option<NaiveDate>,
        completed: bool,
        children: Vec<Self>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            scheduled_date,
            completed,
            children,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_date
    }

    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of immediate children with `completed == true`.
    #[must_use]
    pub fn completed_children(&self) -> usize {
        self.children.iter().filter(|c| c.completed).count()
    }

    /// Walk this node and every descendant in pre-order.
    pub fn walk(&self, visit: &mut impl FnMut(&Self)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub(crate) const fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    /// Recompute this node's flag from its immediate children.
    ///
    /// Leaves are left alone. Returns `true` when the flag changed.
    pub(crate) fn reroll(&mut self) -> bool {
        if self.children.is_empty() {
            return false;
        }
        let all = self.children.iter().all(|c| c.completed);
        let changed = all != self.completed;
        self.completed = all;
        changed
    }

    /// Overwrite this node and every descendant with `completed`.
    ///
    /// Returns the number of nodes whose flag actually changed.
    pub(crate) fn cascade(&mut self, completed: bool) -> usize {
        let mut changed = usize::from(self.completed != completed);
        self.completed = completed;
        for child in &mut self.children {
            changed += child.cascade(completed);
        }
        changed
    }

    /// Post-order normalization of the whole subtree.
    ///
    /// Returns the number of parents whose flag changed.
    pub(crate) fn normalize(&mut self) -> usize {
        let mut changed = 0;
        for child in &mut self.children {
            changed += child.normalize();
        }
        changed + usize::from(self.reroll())
    }
}
