#![no_main]

use libfuzzer_sys::fuzz_target;
use syllabus_core::model::Node;
use syllabus_core::{CourseSnapshot, ProgressEngine, ToggleRule};

fn rolled_up(node: &Node) -> bool {
    node.children().iter().all(rolled_up)
        && (node.is_leaf() || node.completed() == node.children().iter().all(Node::completed))
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = CourseSnapshot::from_json(text) else {
        return;
    };
    let Ok(mut engine) = ProgressEngine::from_snapshot(&snapshot, ToggleRule::Cascade) else {
        return;
    };
    assert!(engine.tree().topics().iter().all(rolled_up));

    let mut ids = Vec::new();
    for topic in engine.tree().topics() {
        topic.walk(&mut |n| ids.push(n.id().to_string()));
    }
    for id in &ids {
        let _ = engine.toggle(id);
        assert!(engine.tree().topics().iter().all(rolled_up));
        assert!(engine.summary().percentage <= 100);
    }
});
