//! The owned topic forest.
//!
//! A [`Tree`] is the single source of truth for completion state in a
//! view session. Nodes are addressed internally by *paths* (child indices
//! from the top level down), which lets the engine walk from a changed
//! node back to the root visiting each ancestor exactly once.
//!
//! # Id discipline
//!
//! The tree tracks every live id plus every id that has been removed.
//! Neither set may be reused: inserts that collide with either fail with
//! [`EngineError::DuplicateId`]. The retired set is written out with the
//! snapshot and seeded back from it, so it outlives a single session.

use std::collections::HashSet;

use tracing::debug;

use crate::error::EngineError;
use crate::model::node::{Node, NodeId};
use crate::model::summary::{ProgressSummary, TopicBreakdown};
use crate::snapshot::{CourseSnapshot, TopicDescriptor};

/// Index path from the top level to a node. Never empty for a live node.
pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    topics: Vec<Node>,
    ids: HashSet<NodeId>,
    retired: HashSet<NodeId>,
}

impl Tree {
    /// Build a tree from store descriptors, validating ids and then
    /// normalizing every parent bottom-up once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyId`] for a blank id and
    /// [`EngineError::DuplicateId`] when an id appears twice anywhere in
    /// the input.
    pub fn build(descriptors: &[TopicDescriptor]) -> Result<Self, EngineError> {
        Self::build_with_retired(descriptors, HashSet::new())
    }

    /// Build from a full course snapshot, reserving its retired ids.
    ///
    /// # Errors
    ///
    /// As [`Tree::build`]; a live id that is also listed as retired is a
    /// [`EngineError::DuplicateId`].
    pub fn from_snapshot(snapshot: &CourseSnapshot) -> Result<Self, EngineError> {
        let retired = snapshot
            .retired
            .iter()
            .filter_map(|raw| NodeId::parse(raw))
            .collect();
        Self::build_with_retired(&snapshot.topics, retired)
    }

    fn build_with_retired(
        descriptors: &[TopicDescriptor],
        retired: HashSet<NodeId>,
    ) -> Result<Self, EngineError> {
        let mut ids = HashSet::new();
        let mut topics = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            topics.push(convert(descriptor, None, &mut ids, &retired)?);
        }

        let mut tree = Self {
            topics,
            ids,
            retired,
        };
        let fixed = tree.normalize();
        if fixed > 0 {
            debug!(fixed, "normalized stale parent flags on build");
        }
        Ok(tree)
    }

    /// Re-roll every parent in post-order. Returns how many flags changed.
    pub(crate) fn normalize(&mut self) -> usize {
        self.topics.iter_mut().map(Node::normalize).sum()
    }

    #[must_use]
    pub fn topics(&self) -> &[Node] {
        &self.topics
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether `id` belonged to a node that has since been removed.
    #[must_use]
    pub fn is_retired(&self, id: &str) -> bool {
        self.retired.contains(id)
    }

    /// Retired ids in sorted order, as written to the snapshot.
    #[must_use]
    pub fn retired_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.retired.iter().map(ToString::to_string).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.path_of(id).and_then(|path| self.node(&path))
    }

    /// Locate `id`, returning its index path. Surrounding whitespace is
    /// ignored, as it is when ids are built.
    #[must_use]
    pub fn path_of(&self, id: &str) -> Option<NodePath> {
        let id = id.trim();
        if !self.ids.contains(id) {
            return None;
        }
        let mut path = Vec::new();
        search(&self.topics, id, &mut path).then_some(path)
    }

    #[must_use]
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut current = self.topics.get(*first)?;
        for index in rest {
            current = current.children().get(*index)?;
        }
        Some(current)
    }

    pub(crate) fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut current = self.topics.get_mut(*first)?;
        for index in rest {
            current = current.children_mut().get_mut(*index)?;
        }
        Some(current)
    }

    /// Ids of every ancestor of `id`, immediate parent first.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        let Some(path) = self.path_of(id) else {
            return Vec::new();
        };
        (1..path.len())
            .rev()
            .filter_map(|depth| self.node(&path[..depth]).map(|n| n.id().clone()))
            .collect()
    }

    /// Summary over top-level topics.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::of(&self.topics)
    }

    /// Per-topic child progress, in tree order.
    #[must_use]
    pub fn breakdown(&self) -> Vec<TopicBreakdown> {
        self.topics.iter().map(TopicBreakdown::of).collect()
    }

    /// Current state in the store's descriptor shape.
    #[must_use]
    pub fn to_descriptors(&self) -> Vec<TopicDescriptor> {
        self.topics.iter().map(describe).collect()
    }

    /// Validate and insert a new subtree as the last child of `parent`
    /// (or as the last topic when `parent` is `None`).
    ///
    /// Does not re-roll anything; the engine does that.
    pub(crate) fn insert(
        &mut self,
        parent: Option<&[usize]>,
        descriptor: &TopicDescriptor,
    ) -> Result<NodePath, EngineError> {
        let parent_id = match parent {
            Some(path) => Some(
                self.node(path)
                    .map(|n| n.id().clone())
                    .ok_or_else(|| EngineError::NotFound {
                        id: NodeId::new_unchecked(descriptor.id.clone()),
                    })?,
            ),
            None => None,
        };

        let mut fresh = self.ids.clone();
        let node = convert(descriptor, parent_id.as_ref(), &mut fresh, &self.retired)?;
        self.ids = fresh;

        let siblings = match parent {
            Some(path) => self
                .node_mut(path)
                .map(Node::children_mut)
                .ok_or_else(|| EngineError::NotFound { id: node.id().clone() })?,
            None => &mut self.topics,
        };
        siblings.push(node);

        let mut path = parent.map(<[usize]>::to_vec).unwrap_or_default();
        path.push(siblings.len() - 1);
        Ok(path)
    }

    /// Detach the node at `path`, retiring its id and every descendant id.
    pub(crate) fn remove(&mut self, path: &[usize]) -> Option<Node> {
        let (last, parent) = path.split_last()?;
        let siblings = if parent.is_empty() {
            &mut self.topics
        } else {
            self.node_mut(parent)?.children_mut()
        };
        if *last >= siblings.len() {
            return None;
        }
        let removed = siblings.remove(*last);

        let mut gone = Vec::new();
        removed.walk(&mut |n| gone.push(n.id().clone()));
        for id in gone {
            self.ids.remove(&id);
            self.retired.insert(id);
        }
        Some(removed)
    }
}

fn search(nodes: &[Node], id: &str, path: &mut NodePath) -> bool {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        if node.id().as_str() == id || search(node.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn convert(
    descriptor: &TopicDescriptor,
    parent: Option<&NodeId>,
    seen: &mut HashSet<NodeId>,
    retired: &HashSet<NodeId>,
) -> Result<Node, EngineError> {
    let id = NodeId::parse(&descriptor.id).ok_or_else(|| EngineError::EmptyId {
        parent: parent.cloned(),
    })?;
    if retired.contains(&id) || !seen.insert(id.clone()) {
        return Err(EngineError::DuplicateId { id });
    }

    let mut children = Vec::with_capacity(descriptor.subtopics.len());
    for sub in &descriptor.subtopics {
        children.push(convert(sub, Some(&id), seen, retired)?);
    }

    Ok(Node::new(
        id,
        descriptor.title.clone(),
        descriptor.description.clone(),
        descriptor.scheduled_date,
        descriptor.completed,
        children,
    ))
}

fn describe(node: &Node) -> TopicDescriptor {
    TopicDescriptor {
        id: node.id().to_string(),
        title: node.title().to_string(),
        description: node.description().map(str::to_string),
        scheduled_date: node.scheduled_date(),
        completed: node.completed(),
        subtopics: node.children().iter().map(describe).collect(),
    }
}
