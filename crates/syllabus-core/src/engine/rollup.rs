//! The two propagation rules.
//!
//! - **Rollup** (bottom-up): after a node changes, each ancestor is
//!   recomputed as the AND of its immediate children, deepest first, so a
//!   grandparent always sees its already-updated parent.
//! - **Cascade** (top-down): a node and every descendant are overwritten
//!   with one value.
//!
//! Both operate on index paths produced by [`Tree::path_of`].

use crate::model::tree::Tree;

/// Re-roll every ancestor of the node at `path`, child to root.
///
/// The node at `path` itself is not touched. Returns the number of
/// ancestors whose flag changed.
pub(crate) fn roll_up(tree: &mut Tree, path: &[usize]) -> usize {
    let mut changed = 0;
    for depth in (1..path.len()).rev() {
        if let Some(ancestor) = tree.node_mut(&path[..depth]) {
            changed += usize::from(ancestor.reroll());
        }
    }
    changed
}

/// Overwrite the node at `path` and its whole subtree with `completed`.
///
/// Returns the number of flags that changed, or `None` for a stale path.
pub(crate) fn cascade(tree: &mut Tree, path: &[usize], completed: bool) -> Option<usize> {
    tree.node_mut(path).map(|node| node.cascade(completed))
}

/// Set only the node at `path`, leaving children alone.
pub(crate) fn set_flag(tree: &mut Tree, path: &[usize], completed: bool) -> Option<bool> {
    tree.node_mut(path).map(|node| {
        let changed = node.completed() != completed;
        node.set_completed(completed);
        changed
    })
}

/// Re-roll the node at `path` itself and then its ancestors.
///
/// Used after structural edits (insert/remove) where the node's own
/// children changed rather than its flag.
pub(crate) fn reroll_from(tree: &mut Tree, path: &[usize]) -> usize {
    let own = tree
        .node_mut(path)
        .map_or(0, |node| usize::from(node.reroll()));
    own + roll_up(tree, path)
}
