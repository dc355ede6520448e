//! Display-only derivations over a [`Tree`].
//!
//! Nothing here is stored back on a node. The indeterminate checkbox
//! state, filters, search, and schedule alerts are recomputed from the
//! tree each time a view is rendered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::node::Node;
use crate::model::tree::Tree;

/// Visual state of a unit's checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
    /// Some but not all of the unit's children are done.
    Indeterminate,
}

impl CheckState {
    /// Derive the checkbox state of `node`.
    ///
    /// A parent is indeterminate when it is not complete and at least one
    /// immediate child is either complete or itself indeterminate.
    #[must_use]
    pub fn of(node: &Node) -> Self {
        if node.completed() {
            return Self::Checked;
        }
        let partial = node
            .children()
            .iter()
            .any(|child| Self::of(child) != Self::Unchecked);
        if partial {
            Self::Indeterminate
        } else {
            Self::Unchecked
        }
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Checked => "[x]",
            Self::Unchecked => "[ ]",
            Self::Indeterminate => "[-]",
        }
    }
}

/// Completion filter for the topic list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    #[must_use]
    pub const fn admits(self, node: &Node) -> bool {
        match self {
            Self::All => true,
            Self::Completed => node.completed(),
            Self::Incomplete => !node.completed(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            "incomplete" | "open" | "todo" => Ok(Self::Incomplete),
            other => Err(format!(
                "unknown filter '{other}': expected all, completed, or incomplete"
            )),
        }
    }
}

/// Case-insensitive substring match on title or description.
///
/// An empty or whitespace-only term matches everything.
#[must_use]
pub fn matches_search(node: &Node, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    node.title().to_lowercase().contains(&term)
        || node
            .description()
            .is_some_and(|d| d.to_lowercase().contains(&term))
}

/// Top-level topics admitted by both the filter and the search term,
/// in tree order.
#[must_use]
pub fn select<'a>(tree: &'a Tree, filter: Filter, search: Option<&str>) -> Vec<&'a Node> {
    tree.topics()
        .iter()
        .filter(|topic| filter.admits(topic))
        .filter(|topic| search.is_none_or(|term| matches_search(topic, term)))
        .collect()
}

/// Incomplete topics whose scheduled date is strictly before `today`.
#[must_use]
pub fn behind_schedule(tree: &Tree, today: NaiveDate) -> Vec<&Node> {
    tree.topics()
        .iter()
        .filter(|topic| !topic.completed())
        .filter(|topic| topic.scheduled_date().is_some_and(|date| date < today))
        .collect()
}

/// Fixed-width text progress bar.
#[must_use]
pub fn progress_bar(percentage: u8, width: usize) -> String {
    let pct = usize::from(percentage.min(100));
    let filled = (pct * width + 50) / 100;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Serializable render model of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    pub completed: bool,
    pub state: CheckState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtopics: Vec<NodeView>,
}

impl NodeView {
    #[must_use]
    pub fn of(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            title: node.title().to_string(),
            description: node.description().map(str::to_string),
            scheduled_date: node.scheduled_date(),
            completed: node.completed(),
            state: CheckState::of(node),
            subtopics: node.children().iter().map(Self::of).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TopicDescriptor;

    fn tree() -> Tree {
        Tree::build(&[
            TopicDescriptor::new("t1", "Introduction to Computing")
                .with_description("History of computing and architecture")
                .scheduled(NaiveDate::from_ymd_opt(2024, 1, 10).expect("date"))
                .with_subtopics(vec![
                    TopicDescriptor::new("s1", "History").completed(true),
                    TopicDescriptor::new("s2", "Binary"),
                ]),
            TopicDescriptor::new("t2", "Control Structures")
                .scheduled(NaiveDate::from_ymd_opt(2024, 1, 17).expect("date"))
                .completed(true),
            TopicDescriptor::new("t3", "File Handling")
                .scheduled(NaiveDate::from_ymd_opt(2024, 3, 1).expect("date")),
            TopicDescriptor::new("t4", "Algorithms"),
        ])
        .expect("build")
    }

    #[test]
    fn check_state_detects_partial_parent() {
        let tree = tree();
        assert_eq!(
            CheckState::of(tree.find("t1").expect("t1")),
            CheckState::Indeterminate
        );
        assert_eq!(CheckState::of(tree.find("t2").expect("t2")), CheckState::Checked);
        assert_eq!(CheckState::of(tree.find("t3").expect("t3")), CheckState::Unchecked);
        assert_eq!(CheckState::of(tree.find("s2").expect("s2")), CheckState::Unchecked);
    }

    #[test]
    fn indeterminate_propagates_through_depth() {
        let tree = Tree::build(&[TopicDescriptor::new("g", "G").with_subtopics(vec![
            TopicDescriptor::new("t", "T").with_subtopics(vec![
                TopicDescriptor::new("a", "A").completed(true),
                TopicDescriptor::new("b", "B"),
            ]),
            TopicDescriptor::new("u", "U"),
        ])])
        .expect("build");
        assert_eq!(CheckState::of(tree.find("g").expect("g")), CheckState::Indeterminate);
    }

    #[test]
    fn filter_and_search_compose() {
        let tree = tree();
        let ids = |nodes: Vec<&Node>| nodes.iter().map(|n| n.id().to_string()).collect::<Vec<_>>();

        assert_eq!(ids(select(&tree, Filter::All, None)), vec!["t1", "t2", "t3", "t4"]);
        assert_eq!(ids(select(&tree, Filter::Completed, None)), vec!["t2"]);
        assert_eq!(
            ids(select(&tree, Filter::Incomplete, Some("ARCHITECTURE"))),
            vec!["t1"]
        );
        assert_eq!(ids(select(&tree, Filter::All, Some("   "))).len(), 4);
        assert!(select(&tree, Filter::Completed, Some("file")).is_empty());
    }

    #[test]
    fn filter_parses_aliases() {
        assert_eq!("Done".parse::<Filter>(), Ok(Filter::Completed));
        assert_eq!("incomplete".parse::<Filter>(), Ok(Filter::Incomplete));
        assert!("someday".parse::<Filter>().is_err());
    }

    #[test]
    fn behind_schedule_skips_completed_and_unscheduled() {
        let tree = tree();
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).expect("date");
        let late: Vec<_> = behind_schedule(&tree, today)
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(late, vec!["t1"]);

        // Scheduled today is not yet late.
        let on_day = NaiveDate::from_ymd_opt(2024, 1, 10).expect("date");
        assert!(behind_schedule(&tree, on_day).is_empty());
    }

    #[test]
    fn progress_bar_widths() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(33, 16).chars().count(), 16);
    }

    #[test]
    fn node_view_carries_state() {
        let tree = tree();
        let view = NodeView::of(tree.find("t1").expect("t1"));
        assert_eq!(view.state, CheckState::Indeterminate);
        assert_eq!(view.subtopics.len(), 2);
        let json = serde_json::to_value(&view).expect("json");
        assert_eq!(json["state"], "indeterminate");
    }
}
