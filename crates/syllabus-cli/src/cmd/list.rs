use std::io::Write;

use anyhow::Result;
use clap::Args;
use syllabus_core::view::{self, Filter, NodeView};

use super::{Context, glyph_line};
use crate::output::render_mode;

/// Arguments for `syl list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Completion filter: all, completed, or incomplete.
    #[arg(long, default_value = "all")]
    pub filter: Filter,

    /// Case-insensitive match on title or description.
    #[arg(long, short)]
    pub search: Option<String>,
}

/// Execute `syl list`: top-level topics matching the filter and search.
pub fn run_list(args: &ListArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let topics: Vec<NodeView> = view::select(session.engine().tree(), args.filter, args.search.as_deref())
        .into_iter()
        .map(NodeView::of)
        .collect();
    tracing::debug!(filter = %args.filter, matched = topics.len(), "listing topics");

    render_mode(
        ctx.output,
        &topics,
        |items, w| {
            for t in items {
                writeln!(w, "{}\t{}\t{}", t.id, t.completed, t.title)?;
            }
            Ok(())
        },
        |items, w| {
            if items.is_empty() {
                return writeln!(w, "No topics match.");
            }
            for t in items {
                writeln!(w, "{}", glyph_line(t.state, &t.id, &t.title))?;
                if let Some(desc) = &t.description {
                    writeln!(w, "    {desc}")?;
                }
            }
            Ok(())
        },
    )
}
