use proptest::prelude::*;
use syllabus_core::model::Node;
use syllabus_core::{TopicDescriptor, Tree};

/// Tree shape without ids; ids are assigned afterwards so they are unique.
#[derive(Debug, Clone)]
pub struct Shape {
    pub completed: bool,
    pub children: Vec<Shape>,
}

pub fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = any::<bool>().prop_map(|completed| Shape {
        completed,
        children: Vec::new(),
    });
    leaf.prop_recursive(3, 48, 4, |inner| {
        (any::<bool>(), prop::collection::vec(inner, 0..4))
            .prop_map(|(completed, children)| Shape { completed, children })
    })
}

/// Between zero and eight top-level topics of arbitrary depth.
pub fn arb_descriptors() -> impl Strategy<Value = Vec<TopicDescriptor>> {
    prop::collection::vec(arb_shape(), 0..8).prop_map(|shapes| {
        let mut next = 0;
        shapes.iter().map(|shape| assign(shape, &mut next)).collect()
    })
}

/// Descriptors plus a batch of `(node index, value)` writes.
pub fn arb_tree_and_writes() -> impl Strategy<Value = (Vec<TopicDescriptor>, Vec<(usize, bool)>)> {
    (
        arb_descriptors(),
        prop::collection::vec((any::<usize>(), any::<bool>()), 0..24),
    )
}

fn assign(shape: &Shape, next: &mut usize) -> TopicDescriptor {
    let id = format!("n{next}");
    *next += 1;
    let children = shape.children.iter().map(|c| assign(c, next)).collect();
    TopicDescriptor::new(id.clone(), format!("Unit {id}"))
        .completed(shape.completed)
        .with_subtopics(children)
}

/// Every id in the tree, pre-order.
pub fn all_ids(tree: &Tree) -> Vec<String> {
    let mut ids = Vec::new();
    for topic in tree.topics() {
        topic.walk(&mut |n| ids.push(n.id().to_string()));
    }
    ids
}

/// Whether every parent equals the AND of its children.
pub fn rollup_holds(tree: &Tree) -> bool {
    fn check(node: &Node) -> bool {
        node.children().iter().all(check)
            && (node.is_leaf() || node.completed() == node.children().iter().all(Node::completed))
    }
    tree.topics().iter().all(check)
}
