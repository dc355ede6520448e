#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::{Path, PathBuf};
use syllabus_core::config::{self, DEFAULT_SNAPSHOT, UserConfig};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "syl: syllabus progress tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Course snapshot file [default: .syllabus/snapshot.json].
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn snapshot_path(&self, project_root: &Path, user: &UserConfig) -> PathBuf {
        let path = self
            .file
            .clone()
            .or_else(|| user.snapshot.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT));
        if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create an empty course",
        after_help = "EXAMPLES:\n    # Start a course in the current directory\n    syl init --title \"CS 101\"\n\n    # Keep the snapshot somewhere else\n    syl --file course.json init\n\n    # Fresh progress record from a shared syllabus\n    syl init --from syllabus.json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the topic tree",
        after_help = "EXAMPLES:\n    # Whole course\n    syl show\n\n    # One topic\n    syl show intro --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show completion percentage",
        long_about = "Show the course percentage (top-level topics only) and per-topic subtopic progress.",
        after_help = "EXAMPLES:\n    # This course\n    syl progress\n\n    # Several courses, one bar each plus the overall total\n    syl progress --all cs101.json math.json"
    )]
    Progress(cmd::progress::ProgressArgs),

    #[command(
        next_help_heading = "Read",
        about = "List topics by completion and search term",
        after_help = "EXAMPLES:\n    # Open topics mentioning recursion\n    syl list --filter incomplete --search recursion"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "List topics that are behind schedule"
    )]
    Alerts(cmd::alerts::AlertsArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Mark a unit complete",
        long_about = "Mark a topic or subtopic complete. Parents complete automatically once all of their subtopics are complete."
    )]
    Check(cmd::mark::MarkArgs),

    #[command(next_help_heading = "Progress", about = "Mark a unit incomplete")]
    Uncheck(cmd::mark::MarkArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Set a topic and all its subtopics",
        after_help = "EXAMPLES:\n    syl topic intro --done\n    syl topic intro --undone"
    )]
    Topic(cmd::mark::TopicArgs),

    #[command(next_help_heading = "Progress", about = "Flip a unit's completion")]
    Toggle(cmd::mark::MarkArgs),

    #[command(
        next_help_heading = "Structure",
        about = "Append a topic",
        after_help = "EXAMPLES:\n    syl add-topic --id files --title \"File Handling\" --scheduled 2024-03-01"
    )]
    AddTopic(cmd::add::NewUnitArgs),

    #[command(
        next_help_heading = "Structure",
        about = "Append a subtopic under a topic",
        after_help = "EXAMPLES:\n    syl add-subtopic files --id files.csv --title \"CSV files\""
    )]
    AddSubtopic(cmd::add::AddSubtopicArgs),

    #[command(next_help_heading = "Structure", about = "Remove a topic or subtopic")]
    Remove(cmd::remove::RemoveArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Recompute parent flags and rewrite the snapshot"
    )]
    Normalize,

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    syl completions bash > /etc/bash_completion.d/syl"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SYLLABUS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "syllabus_core=debug,syl=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("SYLLABUS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let user = config::load_user_config().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable user config");
        UserConfig::default()
    });
    let output = output::resolve_output_mode(cli.format, cli.json, user.output.as_deref());

    let project = match config::load_project_config(&project_root) {
        Ok(project) => project,
        Err(err) => {
            let code = syllabus_core::ErrorCode::ConfigParseError;
            output::render_error(
                output,
                &output::CliError::with_details(
                    format!("{err:#}"),
                    code.hint().unwrap_or(code.message()),
                    code.code(),
                ),
            )?;
            return Err(err);
        }
    };

    let ctx = cmd::Context {
        snapshot_path: cli.snapshot_path(&project_root, &user),
        project,
        output,
        quiet: cli.quiet,
    };
    debug!(snapshot = %ctx.snapshot_path.display(), ?output, "resolved context");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx, &project_root),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Progress(args) => cmd::progress::run_progress(args, &ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Alerts(args) => cmd::alerts::run_alerts(args, &ctx),
        Commands::Check(args) => cmd::mark::run_check(args, true, &ctx),
        Commands::Uncheck(args) => cmd::mark::run_check(args, false, &ctx),
        Commands::Topic(args) => cmd::mark::run_topic(args, &ctx),
        Commands::Toggle(args) => cmd::mark::run_toggle(args, &ctx),
        Commands::AddTopic(args) => cmd::add::run_add_topic(args, &ctx),
        Commands::AddSubtopic(args) => cmd::add::run_add_subtopic(args, &ctx),
        Commands::Remove(args) => cmd::remove::run_remove(args, &ctx),
        Commands::Normalize => cmd::normalize::run_normalize(&ctx),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["syl", "--json", "progress"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["syl", "progress", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["syl", "show", "--format", "text"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn file_flag_overrides_user_snapshot() {
        let user = UserConfig {
            output: None,
            snapshot: Some(PathBuf::from("/srv/user.json")),
        };
        let root = Path::new("/work");

        let cli = Cli::parse_from(["syl", "--file", "course.json", "show"]);
        assert_eq!(cli.snapshot_path(root, &user), PathBuf::from("/work/course.json"));

        let cli = Cli::parse_from(["syl", "show"]);
        assert_eq!(cli.snapshot_path(root, &user), PathBuf::from("/srv/user.json"));
        assert_eq!(
            cli.snapshot_path(root, &UserConfig::default()),
            PathBuf::from("/work/.syllabus/snapshot.json")
        );
    }

    #[test]
    fn topic_requires_exactly_one_state_flag() {
        assert!(Cli::try_parse_from(["syl", "topic", "t1"]).is_err());
        assert!(Cli::try_parse_from(["syl", "topic", "t1", "--done", "--undone"]).is_err());
        let cli = Cli::parse_from(["syl", "topic", "t1", "--undone"]);
        assert!(matches!(cli.command, Commands::Topic(ref a) if !a.done && a.undone));
    }

    #[test]
    fn list_filter_parses_aliases() {
        let cli = Cli::parse_from(["syl", "list", "--filter", "done", "-s", "loops"]);
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.filter, syllabus_core::view::Filter::Completed);
        assert_eq!(args.search.as_deref(), Some("loops"));
    }

    #[test]
    fn progress_all_takes_several_files() {
        let cli = Cli::parse_from(["syl", "progress", "--all", "a.json", "b.json"]);
        let Commands::Progress(args) = cli.command else {
            panic!("expected progress");
        };
        assert_eq!(args.all, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert!(Cli::try_parse_from(["syl", "progress", "--all"]).is_err());
    }

    #[test]
    fn init_from_parses_path() {
        let cli = Cli::parse_from(["syl", "init", "--from", "syllabus.json"]);
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.from, Some(PathBuf::from("syllabus.json")));
    }

    #[test]
    fn alerts_today_parses_date() {
        let cli = Cli::parse_from(["syl", "alerts", "--today", "2024-02-01"]);
        let Commands::Alerts(args) = cli.command else {
            panic!("expected alerts");
        };
        assert_eq!(args.today, chrono::NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn all_subcommands_parse() {
        let subcommands = [
            vec!["syl", "init", "--title", "CS"],
            vec!["syl", "show"],
            vec!["syl", "progress"],
            vec!["syl", "list"],
            vec!["syl", "alerts"],
            vec!["syl", "check", "x"],
            vec!["syl", "uncheck", "x"],
            vec!["syl", "topic", "x", "--done"],
            vec!["syl", "toggle", "x"],
            vec!["syl", "add-topic", "--id", "x", "--title", "X"],
            vec!["syl", "add-subtopic", "x", "--id", "y", "--title", "Y"],
            vec!["syl", "remove", "x"],
            vec!["syl", "normalize"],
            vec!["syl", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
