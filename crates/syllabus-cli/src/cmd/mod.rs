pub mod add;
pub mod alerts;
pub mod completions;
pub mod init;
pub mod list;
pub mod mark;
pub mod normalize;
pub mod progress;
pub mod remove;
pub mod show;

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use syllabus_core::config::ProjectConfig;
use syllabus_core::session::{Session, SessionError};
use syllabus_core::store::JsonFileStore;
use syllabus_core::view::{self, CheckState};
use syllabus_core::{Action, MutationRequest, Outcome, ProgressSummary};

use crate::output::{CliError, OutputMode, render_error, render_mode};

/// Everything a command needs that is resolved once in `main`.
#[derive(Debug)]
pub struct Context {
    pub snapshot_path: PathBuf,
    pub project: ProjectConfig,
    pub output: OutputMode,
    pub quiet: bool,
}

impl Context {
    /// Open the snapshot file as a session.
    pub fn open_session(&self) -> anyhow::Result<Session> {
        let store = JsonFileStore::new(&self.snapshot_path);
        Session::open(Box::new(store), self.project.engine.parent_write)
            .map_err(|err| self.fail(&err))
    }

    /// Render `err` in the active output mode and turn it into the
    /// process-level error.
    pub fn fail(&self, err: &SessionError) -> anyhow::Error {
        if let Err(render_err) = render_error(self.output, &CliError::from(err)) {
            return render_err;
        }
        anyhow::anyhow!("{err}")
    }
}

/// Result payload for every command that changes the course.
#[derive(Debug, Serialize)]
pub struct ChangeReport {
    /// What happened, in words.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationRequest>,
    pub summary: ProgressSummary,
}

impl ChangeReport {
    pub fn from_outcome(message: impl Into<String>, outcome: &Outcome) -> Self {
        Self {
            message: message.into(),
            mutation: outcome.mutation().cloned(),
            summary: outcome.summary(),
        }
    }
}

/// Dispatch `action` through a fresh session and report the result.
pub fn run_action(ctx: &Context, action: &Action, message: &str) -> anyhow::Result<()> {
    let mut session = ctx.open_session()?;
    let outcome = session.dispatch(action).map_err(|err| ctx.fail(&err))?;
    let report = ChangeReport::from_outcome(message, &outcome);
    render_change(ctx, &report)
}

pub fn render_change(ctx: &Context, report: &ChangeReport) -> anyhow::Result<()> {
    let bar_width = ctx.project.display.bar_width;
    let quiet = ctx.quiet;
    render_mode(
        ctx.output,
        report,
        |r, w| {
            if let Some(m) = &r.mutation {
                writeln!(w, "{}\t{}\t{}", m.id, m.completed, m.scope)?;
            }
            write_summary_text(&r.summary, w)
        },
        |r, w| {
            if !quiet {
                writeln!(w, "✓ {}", r.message)?;
            }
            write_summary_pretty(&r.summary, bar_width, w)
        },
    )
}

pub fn write_summary_text(summary: &ProgressSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}",
        summary.completed_count, summary.total_count, summary.percentage
    )
}

pub fn write_summary_pretty(
    summary: &ProgressSummary,
    bar_width: usize,
    w: &mut dyn Write,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {summary}",
        view::progress_bar(summary.percentage, bar_width)
    )
}

/// One-line label used by pretty listings.
pub fn glyph_line(state: CheckState, id: &str, title: &str) -> String {
    format!("{} {title} ({id})", state.glyph())
}
