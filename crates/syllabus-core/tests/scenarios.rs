//! End-to-end engine scenarios on a three-topic course.

use syllabus_core::view::{self, CheckState, Filter};
use syllabus_core::{
    Action, CourseSnapshot, EngineError, ProgressEngine, Scope, ToggleRule, TopicDescriptor,
    build_tree,
};

fn course() -> Vec<TopicDescriptor> {
    (1..=3)
        .map(|t| {
            TopicDescriptor::new(format!("topic{t}"), format!("Topic {t}")).with_subtopics(vec![
                TopicDescriptor::new(format!("topic{t}-a"), "First half"),
                TopicDescriptor::new(format!("topic{t}-b"), "Second half"),
            ])
        })
        .collect()
}

fn engine() -> ProgressEngine {
    ProgressEngine::new(build_tree(&course()).expect("build"), ToggleRule::default())
}

fn done(engine: &ProgressEngine, id: &str) -> bool {
    engine.tree().find(id).expect(id).completed()
}

fn scenario_a() -> ProgressEngine {
    let mut engine = engine();
    engine.set_leaf_completion("topic1-a", true).expect("a");
    engine.set_leaf_completion("topic1-b", true).expect("b");
    engine
}

#[test]
fn completing_both_subtopics_completes_topic() {
    let engine = scenario_a();
    assert!(done(&engine, "topic1"));

    let summary = engine.summary();
    assert_eq!(summary.completed_count, 1);
    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.percentage, 33);
}

#[test]
fn topic_write_completes_every_subtopic() {
    let mut engine = scenario_a();
    let update = engine.set_topic_completion("topic2", true).expect("cascade");

    assert_eq!(update.mutation.scope, Scope::Topic);
    assert!(done(&engine, "topic2"));
    assert!(done(&engine, "topic2-a"));
    assert!(done(&engine, "topic2-b"));
    assert_eq!(update.summary.completed_count, 2);
    assert_eq!(update.summary.total_count, 3);
    assert_eq!(update.summary.percentage, 67);
}

#[test]
fn clearing_topic_reverts_its_subtopics() {
    let mut engine = scenario_a();
    engine.set_topic_completion("topic1", false).expect("cascade");
    assert!(!done(&engine, "topic1"));
    assert!(!done(&engine, "topic1-a"));
    assert!(!done(&engine, "topic1-b"));
    assert_eq!(engine.summary().percentage, 0);
}

#[test]
fn stale_parent_flag_is_fixed_on_load() {
    let descriptors = vec![TopicDescriptor::new("topic1", "Stale").completed(false).with_subtopics(vec![
        TopicDescriptor::new("s1", "done").completed(true),
        TopicDescriptor::new("s2", "done").completed(true),
    ])];
    let tree = build_tree(&descriptors).expect("build");
    assert!(tree.find("topic1").expect("topic1").completed());
    assert_eq!(tree.summary().percentage, 100);

    // And the reverse: a parent claiming completion over an open child.
    let descriptors = vec![TopicDescriptor::new("topic1", "Overclaimed").completed(true).with_subtopics(vec![
        TopicDescriptor::new("s1", "open"),
    ])];
    let tree = build_tree(&descriptors).expect("build");
    assert!(!tree.find("topic1").expect("topic1").completed());
}

#[test]
fn store_document_drives_full_flow() {
    let json = r#"{
        "courseId": "cs101",
        "title": "Introduction to Computer Science",
        "topics": [
            {
                "id": "intro",
                "title": "Introduction to Computing",
                "description": "History of computing and computer architecture",
                "scheduledDate": "2024-01-10",
                "isCompleted": false,
                "subtopics": [
                    { "id": "history", "title": "History of computing", "completed": true },
                    { "id": "binary", "title": "Binary and number systems" }
                ]
            },
            { "id": "control", "title": "Control Structures", "scheduledDate": "2024-01-17" },
            { "id": "files", "title": "File Handling", "completed": true, "owner": "ignored" }
        ]
    }"#;
    let snapshot = CourseSnapshot::from_json(json).expect("parse");
    let mut engine = ProgressEngine::from_snapshot(&snapshot, ToggleRule::Cascade).expect("engine");

    let intro = engine.tree().find("intro").expect("intro");
    assert_eq!(CheckState::of(intro), CheckState::Indeterminate);
    assert_eq!(engine.summary().percentage, 33);

    let today = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).expect("date");
    let late: Vec<_> = view::behind_schedule(engine.tree(), today)
        .into_iter()
        .map(|n| n.id().to_string())
        .collect();
    assert_eq!(late, vec!["intro", "control"]);

    engine
        .dispatch(&Action::Toggle { id: "binary".into() })
        .expect("toggle");
    assert!(done(&engine, "intro"));
    assert_eq!(view::select(engine.tree(), Filter::Incomplete, None).len(), 1);
    assert!(view::behind_schedule(engine.tree(), today).len() == 1);
}

#[test]
fn reject_rule_reports_subtopic_count() {
    let mut engine = ProgressEngine::new(build_tree(&course()).expect("build"), ToggleRule::Reject);
    let err = engine.set_leaf_completion("topic3", true).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { children: 2, .. }));
    assert_eq!(err.code().code(), "E2002");

    // Topic writes are unaffected by the rule.
    engine.set_topic_completion("topic3", true).expect("cascade");
    assert!(done(&engine, "topic3-b"));
}

#[test]
fn deep_tree_rolls_up_through_every_level() {
    let descriptors = vec![TopicDescriptor::new("unit", "Unit").with_subtopics(vec![
        TopicDescriptor::new("week1", "Week 1").with_subtopics(vec![
            TopicDescriptor::new("lec1", "Lecture 1"),
            TopicDescriptor::new("lab1", "Lab 1"),
        ]),
        TopicDescriptor::new("week2", "Week 2"),
    ])];
    let mut engine = ProgressEngine::new(build_tree(&descriptors).expect("build"), ToggleRule::Cascade);

    engine.set_leaf_completion("week2", true).expect("week2");
    engine.set_leaf_completion("lec1", true).expect("lec1");
    assert!(!done(&engine, "unit"));

    engine.set_leaf_completion("lab1", true).expect("lab1");
    assert!(done(&engine, "week1"));
    assert!(done(&engine, "unit"));

    // Cascading a middle node re-rolls the root above it.
    engine.set_topic_completion("week1", false).expect("cascade");
    assert!(!done(&engine, "lec1"));
    assert!(!done(&engine, "unit"));
    assert!(done(&engine, "week2"));
}
