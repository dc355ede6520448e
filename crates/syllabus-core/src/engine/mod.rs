//! Progress aggregation engine.
//!
//! [`ProgressEngine`] owns a [`Tree`] and is the only way to change it.
//! Two rules coexist:
//!
//! - [`ProgressEngine::set_leaf_completion`] writes one unit and rolls the
//!   change **up**: every ancestor becomes the AND of its children.
//! - [`ProgressEngine::set_topic_completion`] writes a unit and cascades the
//!   value **down** to every descendant, unconditionally.
//!
//! A leaf write aimed at a node that has children is resolved by the
//! engine's [`ToggleRule`]: `Cascade` (the default) treats it as a topic
//! write, `Reject` fails with [`EngineError::InvalidTarget`].
//!
//! Every operation runs to completion synchronously. After each one, a
//! parent's flag equals the AND of its children's flags.

pub mod action;
pub(crate) mod rollup;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::model::mutation::{MutationRequest, Scope, Update};
use crate::model::node::{Node, NodeId};
use crate::model::summary::{CourseProgress, OverallProgress, ProgressSummary};
use crate::model::tree::{NodePath, Tree};
use crate::snapshot::{CourseSnapshot, TopicDescriptor};

pub use action::{Action, Outcome};

/// How a leaf-level write on a node with children is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleRule {
    /// Treat the write as [`ProgressEngine::set_topic_completion`].
    #[default]
    Cascade,
    /// Fail with [`EngineError::InvalidTarget`].
    Reject,
}

/// Build a tree from store descriptors and normalize it.
///
/// # Errors
///
/// See [`Tree::build`].
pub fn build_tree(descriptors: &[TopicDescriptor]) -> Result<Tree, EngineError> {
    Tree::build(descriptors)
}

/// Pure summary over a tree's top-level topics.
#[must_use]
pub fn compute_summary(tree: &Tree) -> ProgressSummary {
    tree.summary()
}

/// Build every course and aggregate their top-level progress.
///
/// Each snapshot is validated and normalized exactly as it would be when
/// opened on its own, so stale parent flags in a file do not skew the
/// total.
///
/// # Errors
///
/// The first course that fails [`Tree::from_snapshot`].
pub fn compute_overall(snapshots: &[CourseSnapshot]) -> Result<OverallProgress, EngineError> {
    let courses = snapshots
        .iter()
        .map(|snapshot| {
            Ok(CourseProgress {
                course_id: snapshot.course_id.clone(),
                title: snapshot.title.clone(),
                summary: Tree::from_snapshot(snapshot)?.summary(),
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    let overall = OverallProgress::of(courses);
    debug!(
        courses = overall.courses.len(),
        completed = overall.completed_count,
        total = overall.total_count,
        "overall progress computed"
    );
    Ok(overall)
}

#[derive(Debug, Clone, Default)]
pub struct ProgressEngine {
    tree: Tree,
    rule: ToggleRule,
}

impl ProgressEngine {
    #[must_use]
    pub const fn new(tree: Tree, rule: ToggleRule) -> Self {
        Self { tree, rule }
    }

    /// Build an engine straight from a store snapshot, retired ids
    /// included.
    ///
    /// # Errors
    ///
    /// See [`Tree::from_snapshot`].
    pub fn from_snapshot(snapshot: &CourseSnapshot, rule: ToggleRule) -> Result<Self, EngineError> {
        Ok(Self::new(Tree::from_snapshot(snapshot)?, rule))
    }

    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub const fn rule(&self) -> ToggleRule {
        self.rule
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        compute_summary(&self.tree)
    }

    /// Current state as outbound descriptors.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TopicDescriptor> {
        self.tree.to_descriptors()
    }

    /// Replace the whole tree. The previous tree, including any local
    /// writes not yet reflected in `tree`, is dropped.
    pub fn replace(&mut self, tree: Tree) {
        self.tree = tree;
    }

    /// Set a unit's completion flag and roll the change up.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if `id` is absent;
    /// [`EngineError::InvalidTarget`] if `id` has children and the rule is
    /// [`ToggleRule::Reject`].
    pub fn set_leaf_completion(&mut self, id: &str, completed: bool) -> Result<Update, EngineError> {
        let (path, node) = self.locate(id)?;
        let node_id = node.id().clone();
        let children = node.children().len();
        if children > 0 {
            return match self.rule {
                ToggleRule::Cascade => {
                    debug!(id, children, "leaf write on parent, cascading");
                    self.set_topic_completion(id, completed)
                }
                ToggleRule::Reject => Err(EngineError::InvalidTarget {
                    id: node_id,
                    children,
                }),
            };
        }

        let changed = rollup::set_flag(&mut self.tree, &path, completed).unwrap_or(false);
        let rolled = if changed {
            rollup::roll_up(&mut self.tree, &path)
        } else {
            0
        };
        debug!(id, completed, changed, rolled, "leaf completion set");

        Ok(self.update(MutationRequest::leaf(node_id, completed)))
    }

    /// Set a unit's flag and overwrite every descendant with the same value.
    ///
    /// Ancestors above the unit are then re-rolled, which only matters for
    /// trees deeper than topic/subtopic.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if `id` is absent.
    pub fn set_topic_completion(&mut self, id: &str, completed: bool) -> Result<Update, EngineError> {
        let (path, node) = self.locate(id)?;
        let node_id = node.id().clone();

        let overwritten = rollup::cascade(&mut self.tree, &path, completed).unwrap_or(0);
        let rolled = rollup::roll_up(&mut self.tree, &path);
        debug!(id, completed, overwritten, rolled, "topic completion cascaded");

        Ok(self.update(MutationRequest::topic(node_id, completed)))
    }

    /// Flip a unit's current flag through the leaf rule.
    ///
    /// # Errors
    ///
    /// As [`ProgressEngine::set_leaf_completion`].
    pub fn toggle(&mut self, id: &str) -> Result<Update, EngineError> {
        let current = self.locate(id)?.1.completed();
        self.set_leaf_completion(id, !current)
    }

    /// Replay an outbound-shaped request into this engine.
    ///
    /// # Errors
    ///
    /// As the operation selected by `request.scope`.
    pub fn apply(&mut self, request: &MutationRequest) -> Result<Update, EngineError> {
        match request.scope {
            Scope::Leaf => self.set_leaf_completion(request.id.as_str(), request.completed),
            Scope::Topic => self.set_topic_completion(request.id.as_str(), request.completed),
        }
    }

    /// Append a new topic at the end of the tree.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateId`] or [`EngineError::EmptyId`] for bad ids.
    pub fn add_topic(&mut self, descriptor: &TopicDescriptor) -> Result<ProgressSummary, EngineError> {
        let path = self.tree.insert(None, descriptor)?;
        self.normalize_subtree(&path);
        debug!(id = %descriptor.id.trim(), "topic added");
        Ok(self.summary())
    }

    /// Append a new subtopic under `parent_id`, re-rolling the parent.
    ///
    /// A parent that was complete becomes incomplete when an incomplete
    /// subtopic arrives.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unknown parent, otherwise as
    /// [`ProgressEngine::add_topic`].
    pub fn add_subtopic(
        &mut self,
        parent_id: &str,
        descriptor: &TopicDescriptor,
    ) -> Result<ProgressSummary, EngineError> {
        let (parent_path, _) = self.locate(parent_id)?;
        let path = self.tree.insert(Some(&parent_path), descriptor)?;
        self.normalize_subtree(&path);
        rollup::reroll_from(&mut self.tree, &parent_path);
        debug!(parent = parent_id, id = %descriptor.id.trim(), "subtopic added");
        Ok(self.summary())
    }

    /// Remove a unit and its subtree. Its ids are retired for good.
    ///
    /// A parent left without children keeps its current flag and becomes
    /// a leaf.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if `id` is absent.
    pub fn remove_node(&mut self, id: &str) -> Result<ProgressSummary, EngineError> {
        let (path, _) = self.locate(id)?;
        let removed = self
            .tree
            .remove(&path)
            .ok_or_else(|| EngineError::NotFound {
                id: NodeId::new_unchecked(id),
            })?;
        if let Some((_, parent)) = path.split_last() {
            if !parent.is_empty() {
                rollup::reroll_from(&mut self.tree, parent);
            }
        }
        debug!(id, subtree = count(&removed), "node removed");
        Ok(self.summary())
    }

    fn locate(&self, id: &str) -> Result<(NodePath, &Node), EngineError> {
        let not_found = || EngineError::NotFound {
            id: NodeId::new_unchecked(id.trim()),
        };
        let path = self.tree.path_of(id).ok_or_else(not_found)?;
        let node = self.tree.node(&path).ok_or_else(not_found)?;
        Ok((path, node))
    }

    fn normalize_subtree(&mut self, path: &[usize]) {
        if let Some(node) = self.tree.node_mut(path) {
            node.normalize();
        }
    }

    fn update(&self, mutation: MutationRequest) -> Update {
        Update {
            mutation,
            summary: self.summary(),
        }
    }
}

fn count(node: &Node) -> usize {
    let mut n = 0;
    node.walk(&mut |_| n += 1);
    n
}
