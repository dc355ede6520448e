//! `syl progress`: course summary plus a per-topic breakdown.
//!
//! The headline number counts top-level topics only. Each topic row shows
//! how far along its own subtopics are, which is what the course card in a
//! dashboard would show.
//!
//! `--all` reads several course files instead and reports one bar per
//! course plus the overall percentage across all of them.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use syllabus_core::model::{CourseProgress, TopicBreakdown};
use syllabus_core::session::SessionError;
use syllabus_core::store::{JsonFileStore, TopicStore};
use syllabus_core::{ProgressSummary, compute_overall, view};

use super::{Context, write_summary_pretty, write_summary_text};
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Omit the per-topic rows.
    #[arg(long)]
    pub summary_only: bool,

    /// Aggregate these course snapshot files instead of the current one.
    #[arg(long, value_name = "SNAPSHOT", num_args = 1.., conflicts_with = "summary_only")]
    pub all: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProgressOutput {
    summary: ProgressSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    topics: Vec<TopicBreakdown>,
}

pub fn run_progress(args: &ProgressArgs, ctx: &Context) -> Result<()> {
    if !args.all.is_empty() {
        return run_overall(&args.all, ctx);
    }
    let session = ctx.open_session()?;
    let report = ProgressOutput {
        summary: session.summary(),
        topics: if args.summary_only {
            Vec::new()
        } else {
            session.engine().tree().breakdown()
        },
    };

    let bar_width = ctx.project.display.bar_width;
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            write_summary_text(&r.summary, w)?;
            for topic in &r.topics {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    topic.id, topic.completed_count, topic.total_count, topic.percentage
                )?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, "Progress")?;
            write_summary_pretty(&r.summary, bar_width, w)?;
            if r.topics.is_empty() {
                return Ok(());
            }
            writeln!(w)?;
            let width = r.topics.iter().map(|t| t.title.chars().count()).max().unwrap_or(0);
            for topic in &r.topics {
                writeln!(
                    w,
                    "{:<width$}  {} {:>3}% ({}/{})",
                    topic.title,
                    view::progress_bar(topic.percentage, bar_width / 2),
                    topic.percentage,
                    topic.completed_count,
                    topic.total_count,
                )?;
            }
            Ok(())
        },
    )
}

fn course_label(index: usize, course: &CourseProgress, paths: &[PathBuf]) -> String {
    course
        .title
        .clone()
        .or_else(|| course.course_id.clone())
        .or_else(|| paths.get(index).map(|p| p.display().to_string()))
        .unwrap_or_default()
}

fn run_overall(paths: &[PathBuf], ctx: &Context) -> Result<()> {
    let snapshots = paths
        .iter()
        .map(|path| JsonFileStore::new(path).load())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ctx.fail(&SessionError::Store(err)))?;
    let overall =
        compute_overall(&snapshots).map_err(|err| ctx.fail(&SessionError::Engine(err)))?;

    let bar_width = ctx.project.display.bar_width;
    render_mode(
        ctx.output,
        &overall,
        |r, w| {
            write_summary_text(&r.summary(), w)?;
            for (index, course) in r.courses.iter().enumerate() {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    course_label(index, course, paths),
                    course.summary.completed_count,
                    course.summary.total_count,
                    course.summary.percentage
                )?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, "Overall progress")?;
            write_summary_pretty(&r.summary(), bar_width, w)?;
            writeln!(w)?;
            let labels: Vec<String> = r
                .courses
                .iter()
                .enumerate()
                .map(|(index, course)| course_label(index, course, paths))
                .collect();
            let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            for (label, course) in labels.iter().zip(&r.courses) {
                writeln!(
                    w,
                    "{label:<width$}  {} {}",
                    view::progress_bar(course.summary.percentage, bar_width),
                    course.summary
                )?;
            }
            Ok(())
        },
    )
}
