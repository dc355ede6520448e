//! Completion writes: `check`, `uncheck`, `topic`, `toggle`.
//!
//! Each command is a single [`Action`] dispatched through a session, so
//! the JSON file is updated exactly as an external store would be.

use anyhow::Result;
use clap::Args;
use syllabus_core::Action;

use super::{Context, run_action};

/// Arguments for `syl check` and `syl uncheck`.
#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Topic or subtopic ID.
    pub id: String,
}

/// Arguments for `syl topic`.
#[derive(Args, Debug)]
pub struct TopicArgs {
    /// Topic ID. Every subtopic underneath takes the same value.
    pub id: String,

    /// Mark the topic and all its subtopics complete.
    #[arg(long, conflicts_with = "undone", required_unless_present = "undone")]
    pub done: bool,

    /// Mark the topic and all its subtopics incomplete.
    #[arg(long)]
    pub undone: bool,
}

pub fn run_check(args: &MarkArgs, completed: bool, ctx: &Context) -> Result<()> {
    let verb = if completed { "Checked" } else { "Unchecked" };
    run_action(
        ctx,
        &Action::Check {
            id: args.id.clone(),
            completed,
        },
        &format!("{verb} {}", args.id),
    )
}

pub fn run_topic(args: &TopicArgs, ctx: &Context) -> Result<()> {
    let completed = args.done;
    let verb = if completed { "Completed" } else { "Reopened" };
    run_action(
        ctx,
        &Action::SetTopic {
            id: args.id.clone(),
            completed,
        },
        &format!("{verb} {} and its subtopics", args.id),
    )
}

pub fn run_toggle(args: &MarkArgs, ctx: &Context) -> Result<()> {
    run_action(
        ctx,
        &Action::Toggle { id: args.id.clone() },
        &format!("Toggled {}", args.id),
    )
}
