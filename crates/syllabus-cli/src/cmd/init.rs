use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use syllabus_core::Tree;
use syllabus_core::config::{self, PROJECT_DIR, ProjectConfig};
use syllabus_core::session::SessionError;
use syllabus_core::snapshot::CourseSnapshot;
use syllabus_core::store::{JsonFileStore, TopicStore};

use super::Context;
use crate::output::{pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Course title stored in the snapshot.
    #[arg(long)]
    pub title: Option<String>,

    /// Course identifier stored in the snapshot.
    #[arg(long)]
    pub course_id: Option<String>,

    /// Overwrite an existing snapshot with an empty course.
    #[arg(long)]
    pub force: bool,

    /// Start from an existing syllabus file, copying its topics with
    /// every unit reset to incomplete.
    #[arg(long, value_name = "PATH")]
    pub from: Option<PathBuf>,
}

impl InitArgs {
    /// The snapshot to write: a blank course, or a fresh progress record
    /// for the `--from` syllabus. `--title` and `--course-id` override
    /// whatever the syllabus carries.
    fn starting_snapshot(&self, ctx: &Context) -> Result<CourseSnapshot> {
        let mut snapshot = match &self.from {
            Some(path) => {
                let syllabus = JsonFileStore::new(path)
                    .load()
                    .map_err(|err| ctx.fail(&SessionError::Store(err)))?;
                Tree::from_snapshot(&syllabus)
                    .map_err(|err| ctx.fail(&SessionError::Engine(err)))?;
                syllabus.fresh_progress()
            }
            None => CourseSnapshot::default(),
        };
        if self.course_id.is_some() {
            snapshot.course_id.clone_from(&self.course_id);
        }
        if self.title.is_some() {
            snapshot.title.clone_from(&self.title);
        }
        Ok(snapshot)
    }
}

#[derive(Debug, Serialize)]
struct InitReport {
    snapshot: String,
    config: String,
    config_written: bool,
    topics: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
}

/// Execute `syl init`. Creates:
///
/// ```text
/// .syllabus/
///   config.toml     (default project config, kept if present)
///   snapshot.json   (empty course, or wherever --file points)
/// ```
///
/// # Errors
///
/// Returns an error if the snapshot already exists and `--force` is not
/// set, or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, ctx: &Context, project_root: &Path) -> Result<()> {
    let mut store = JsonFileStore::new(&ctx.snapshot_path);
    if store.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use `syl init --force` to start over.",
            ctx.snapshot_path.display()
        );
    }

    let snapshot = args.starting_snapshot(ctx)?;

    let config_path = config::project_config_path(project_root);
    let config_written = !config_path.exists();
    if config_written {
        std::fs::create_dir_all(project_root.join(PROJECT_DIR))
            .with_context(|| format!("Failed to create {PROJECT_DIR}/"))?;
        let body = config::render_project_config(&ProjectConfig::default())?;
        std::fs::write(&config_path, body)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    }

    store
        .replace(&snapshot)
        .with_context(|| format!("Failed to write {}", ctx.snapshot_path.display()))?;
    tracing::info!(
        path = %ctx.snapshot_path.display(),
        topics = snapshot.topics.len(),
        "course initialized"
    );

    let report = InitReport {
        snapshot: ctx.snapshot_path.display().to_string(),
        config: config_path.display().to_string(),
        config_written,
        topics: snapshot.topics.len(),
        from: args.from.as_ref().map(|p| p.display().to_string()),
    };
    render_mode(
        ctx.output,
        &report,
        |r, w| writeln!(w, "{}\t{}", r.snapshot, r.config),
        |r, w| {
            match &r.from {
                Some(from) => writeln!(
                    w,
                    "✓ Initialized course from {from} ({} topics, none complete).",
                    r.topics
                )?,
                None => writeln!(w, "✓ Initialized empty course.")?,
            }
            writeln!(w)?;
            pretty_kv(w, "Snapshot", &r.snapshot)?;
            pretty_kv(w, "Config", &r.config)?;
            writeln!(w)?;
            writeln!(w, "Next steps:")?;
            if r.from.is_none() {
                writeln!(w, "  syl add-topic --id intro --title \"Introduction\"")?;
            }
            writeln!(w, "  syl progress")
        },
    )
}
