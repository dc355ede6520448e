use anyhow::Result;
use clap::Args;
use syllabus_core::Action;

use super::{Context, run_action};

/// Arguments for `syl remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Topic or subtopic ID. Its subtopics are removed with it.
    pub id: String,
}

/// Execute `syl remove`. The parent, if any, is re-rolled afterwards.
pub fn run_remove(args: &RemoveArgs, ctx: &Context) -> Result<()> {
    run_action(
        ctx,
        &Action::Remove { id: args.id.clone() },
        &format!("Removed {}", args.id),
    )
}
