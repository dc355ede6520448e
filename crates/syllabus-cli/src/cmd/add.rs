use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use syllabus_core::{Action, TopicDescriptor};

use super::{Context, run_action};

/// Fields shared by `syl add-topic` and `syl add-subtopic`.
#[derive(Args, Debug)]
pub struct NewUnitArgs {
    /// Unique ID for the new unit. IDs of removed units cannot be reused.
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Planned date (YYYY-MM-DD), used by `syl alerts`.
    #[arg(long)]
    pub scheduled: Option<NaiveDate>,

    /// Create the unit already completed.
    #[arg(long)]
    pub completed: bool,
}

impl NewUnitArgs {
    fn descriptor(&self) -> TopicDescriptor {
        let mut descriptor = TopicDescriptor::new(self.id.clone(), self.title.clone())
            .completed(self.completed);
        if let Some(description) = &self.description {
            descriptor = descriptor.with_description(description.clone());
        }
        if let Some(date) = self.scheduled {
            descriptor = descriptor.scheduled(date);
        }
        descriptor
    }
}

/// Arguments for `syl add-subtopic`.
#[derive(Args, Debug)]
pub struct AddSubtopicArgs {
    /// ID of the topic (or subtopic) to add under.
    pub parent: String,

    #[command(flatten)]
    pub unit: NewUnitArgs,
}

pub fn run_add_topic(args: &NewUnitArgs, ctx: &Context) -> Result<()> {
    run_action(
        ctx,
        &Action::AddTopic {
            topic: args.descriptor(),
        },
        &format!("Added topic {}", args.id),
    )
}

pub fn run_add_subtopic(args: &AddSubtopicArgs, ctx: &Context) -> Result<()> {
    run_action(
        ctx,
        &Action::AddSubtopic {
            parent: args.parent.clone(),
            topic: args.unit.descriptor(),
        },
        &format!("Added {} under {}", args.unit.id, args.parent),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_carries_optional_fields() {
        let args = NewUnitArgs {
            id: "w3".into(),
            title: "Week 3".into(),
            description: Some("Recursion".into()),
            scheduled: NaiveDate::from_ymd_opt(2024, 2, 5),
            completed: false,
        };
        let d = args.descriptor();
        assert_eq!(d.id, "w3");
        assert_eq!(d.description.as_deref(), Some("Recursion"));
        assert_eq!(d.scheduled_date, NaiveDate::from_ymd_opt(2024, 2, 5));
        assert!(d.subtopics.is_empty());
    }
}
