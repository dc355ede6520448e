use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use syllabus_core::view;

use super::Context;
use crate::output::{pretty_section, render_mode};

/// Arguments for `syl alerts`.
#[derive(Args, Debug)]
pub struct AlertsArgs {
    /// Reference date (YYYY-MM-DD). Defaults to today in local time.
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct LateTopic {
    id: String,
    title: String,
    scheduled_date: NaiveDate,
    days_late: i64,
}

#[derive(Debug, Serialize)]
struct AlertsOutput {
    today: NaiveDate,
    behind: Vec<LateTopic>,
}

/// Execute `syl alerts`: incomplete topics whose scheduled date has passed.
pub fn run_alerts(args: &AlertsArgs, ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let behind = view::behind_schedule(session.engine().tree(), today)
        .into_iter()
        .filter_map(|node| {
            let scheduled_date = node.scheduled_date()?;
            Some(LateTopic {
                id: node.id().to_string(),
                title: node.title().to_string(),
                scheduled_date,
                days_late: (today - scheduled_date).num_days(),
            })
        })
        .collect();
    let report = AlertsOutput { today, behind };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for t in &r.behind {
                writeln!(w, "{}\t{}\t{}", t.id, t.scheduled_date, t.days_late)?;
            }
            Ok(())
        },
        |r, w| {
            if r.behind.is_empty() {
                return writeln!(w, "✓ On schedule as of {}.", r.today);
            }
            pretty_section(w, &format!("Behind schedule ({})", r.behind.len()))?;
            for t in &r.behind {
                writeln!(
                    w,
                    "! {} ({}) was due {}, {} day(s) ago",
                    t.title, t.id, t.scheduled_date, t.days_late
                )?;
            }
            Ok(())
        },
    )
}
