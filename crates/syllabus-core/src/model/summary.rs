use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::node::Node;

/// Aggregate progress over the top-level topics of a tree.
///
/// Subtopics never enter the denominator; they only matter through the
/// flag they roll up into their topic.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed_count: usize,
    pub total_count: usize,
    /// Rounded half-up, in `0..=100`. Zero for an empty tree.
    pub percentage: u8,
}

impl ProgressSummary {
    /// Summarize a slice of top-level nodes.
    #[must_use]
    pub fn of(topics: &[Node]) -> Self {
        let total_count = topics.len();
        let completed_count = topics.iter().filter(|t| t.completed()).count();
        Self {
            completed_count,
            total_count,
            percentage: percent(completed_count, total_count),
        }
    }

    /// Number of topics not yet complete.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total_count.saturating_sub(self.completed_count)
    }

    /// Returns `true` if every topic is complete and there is at least one.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completed_count == self.total_count
    }
}

impl fmt::Display for ProgressSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% Complete ({}/{} topics)",
            self.percentage, self.completed_count, self.total_count
        )
    }
}

/// Per-topic progress over that topic's immediate children.
///
/// A topic without subtopics counts as a single unit of itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicBreakdown {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub percentage: u8,
}

impl TopicBreakdown {
    #[must_use]
    pub fn of(topic: &Node) -> Self {
        let (completed_count, total_count) = if topic.is_leaf() {
            (usize::from(topic.completed()), 1)
        } else {
            (topic.completed_children(), topic.children().len())
        };
        Self {
            id: topic.id().to_string(),
            title: topic.title().to_string(),
            completed: topic.completed(),
            completed_count,
            total_count,
            percentage: percent(completed_count, total_count),
        }
    }
}

/// One course's line in an [`OverallProgress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub summary: ProgressSummary,
}

/// Progress across several courses.
///
/// The headline counts are summed over every course's top-level topics,
/// so a large course weighs more than a small one. Courses without
/// topics are listed but add nothing to either count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub completed_count: usize,
    pub total_count: usize,
    pub percentage: u8,
    pub courses: Vec<CourseProgress>,
}

impl OverallProgress {
    #[must_use]
    pub fn of(courses: Vec<CourseProgress>) -> Self {
        let completed_count = courses.iter().map(|c| c.summary.completed_count).sum();
        let total_count = courses.iter().map(|c| c.summary.total_count).sum();
        Self {
            completed_count,
            total_count,
            percentage: percent(completed_count, total_count),
            courses,
        }
    }

    /// The headline numbers as a plain summary.
    #[must_use]
    pub const fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            completed_count: self.completed_count,
            total_count: self.total_count,
            percentage: self.percentage,
        }
    }
}

/// `round(done / total * 100)` with halves rounded up, guarded for
/// `total == 0`.
///
/// Integer arithmetic keeps `1/3 -> 33`, `2/3 -> 67` and `1/8 -> 13`
/// exact without float drift.
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    let scaled = (done * 200 + total) / (total * 2);
    u8::try_from(scaled).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(3, 8), 38); // 37.5
        assert_eq!(percent(1, 200), 1); // 0.5
        assert_eq!(percent(0, 5), 0);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn percent_guards_empty_and_clamps() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(4, 0), 0);
        assert_eq!(percent(9, 3), 100);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = ProgressSummary::of(&[]);
        assert_eq!(summary, ProgressSummary::default());
        assert!(!summary.is_complete());
        assert_eq!(summary.remaining(), 0);
    }

    #[test]
    fn display_matches_progress_text() {
        let summary = ProgressSummary {
            completed_count: 3,
            total_count: 8,
            percentage: 38,
        };
        assert_eq!(summary.to_string(), "38% Complete (3/8 topics)");
    }

    fn course(id: &str, completed_count: usize, total_count: usize) -> CourseProgress {
        CourseProgress {
            course_id: Some(id.to_string()),
            title: None,
            summary: ProgressSummary {
                completed_count,
                total_count,
                percentage: percent(completed_count, total_count),
            },
        }
    }

    #[test]
    fn overall_sums_top_level_counts_across_courses() {
        let overall = OverallProgress::of(vec![course("a", 1, 2), course("b", 0, 0), course("c", 2, 6)]);
        assert_eq!(overall.completed_count, 3);
        assert_eq!(overall.total_count, 8);
        assert_eq!(overall.percentage, 38);
        assert_eq!(overall.courses.len(), 3);
        assert_eq!(overall.courses[1].summary.percentage, 0);
        assert_eq!(overall.summary().to_string(), "38% Complete (3/8 topics)");
    }

    #[test]
    fn overall_of_empty_courses_is_zero() {
        assert_eq!(OverallProgress::of(Vec::new()).percentage, 0);
        let overall = OverallProgress::of(vec![course("a", 0, 0)]);
        assert_eq!(overall.summary(), ProgressSummary::default());
    }

    #[test]
    fn serializes_camel_case() {
        let summary = ProgressSummary {
            completed_count: 1,
            total_count: 3,
            percentage: 33,
        };
        let value = serde_json::to_value(summary).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({ "completedCount": 1, "totalCount": 3, "percentage": 33 })
        );
    }
}
