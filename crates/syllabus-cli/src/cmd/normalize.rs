use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use syllabus_core::ProgressSummary;
use syllabus_core::session::SessionError;
use syllabus_core::store::TopicStore;

use super::{Context, write_summary_text};
use crate::output::render_mode;

#[derive(Debug, Serialize)]
struct NormalizeOutput {
    /// Whether the stored snapshot differed from its normalized form.
    changed: bool,
    summary: ProgressSummary,
}

/// Execute `syl normalize`: rewrite the snapshot with every parent flag
/// recomputed from its children.
pub fn run_normalize(ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session()?;
    let before = session.store().load().map_err(|err| ctx.fail(&SessionError::Store(err)))?;
    let after = session.snapshot();
    let changed = before != after;
    if changed {
        session.save().map_err(|err| ctx.fail(&err))?;
    }
    tracing::info!(changed, "snapshot normalized");

    let report = NormalizeOutput {
        changed,
        summary: session.summary(),
    };
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            writeln!(w, "{}", r.changed)?;
            write_summary_text(&r.summary, w)
        },
        |r, w| {
            if r.changed {
                writeln!(w, "✓ Snapshot normalized.")?;
            } else {
                writeln!(w, "✓ Snapshot already consistent.")?;
            }
            writeln!(w, "{}", r.summary)
        },
    )
}
