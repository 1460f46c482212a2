mod config;

use std::fmt;
use std::path::PathBuf;

use services::{Clock, FrameRows, RenderedFrame, ReviewNavigator, TopicService};
use storage::{InMemorySnapshot, SnapshotSource};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracker_core::aggregate::round_for_display;
use tracker_core::model::{EntryId, TopicId, UserId, ViewSettings};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    EmptyPath { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::EmptyPath { flag } => write!(f, "{flag} cannot be empty"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_path(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<PathBuf, ArgsError> {
    let value = require_value(args, flag)?;
    if value.trim().is_empty() {
        return Err(ArgsError::EmptyPath { flag });
    }
    Ok(PathBuf::from(value))
}

fn require_id<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidId { flag, raw: value })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app report [--snapshot <path>] [--config <path>] [--user <id>] [--json]");
    eprintln!("  app walk   [--snapshot <path>] [--config <path>] [--topic <id>] [--entry <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --snapshot snapshot.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_SNAPSHOT, TRACKER_CONFIG, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Report,
    Walk,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "report" => Some(Self::Report),
            "walk" => Some(Self::Walk),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
struct Args {
    snapshot: PathBuf,
    config: Option<PathBuf>,
    user: Option<UserId>,
    topic: Option<TopicId>,
    entry: Option<EntryId>,
    json: bool,
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            snapshot: env("TRACKER_SNAPSHOT")
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| PathBuf::from("snapshot.json"), PathBuf::from),
            config: env("TRACKER_CONFIG")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            user: None,
            topic: None,
            entry: None,
            json: false,
        };

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--snapshot") => parsed.snapshot = require_path(args, "--snapshot")?,
                (_, "--config") => parsed.config = Some(require_path(args, "--config")?),
                (Command::Report, "--user") => parsed.user = Some(require_id(args, "--user")?),
                (Command::Report, "--json") => parsed.json = true,
                (Command::Walk, "--topic") => parsed.topic = Some(require_id(args, "--topic")?),
                (Command::Walk, "--entry") => parsed.entry = Some(require_id(args, "--entry")?),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

async fn load_snapshot(path: &std::path::Path) -> Result<InMemorySnapshot, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("cannot read snapshot {}: {e}", path.display()))?;
    Ok(InMemorySnapshot::from_json(&raw)?)
}

async fn report(
    source: &dyn SnapshotSource,
    settings: &ViewSettings,
    user: Option<UserId>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut topics = TopicService::load(source).await?;
    if let Some(user) = user {
        let entries = source.fetch_entries().await?;
        topics = topics.with_learner_mastery(&entries, user);
    }

    let results = topics.aggregate_all();
    info!(topics = results.len(), "aggregated snapshot");
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let decimals = settings.progress_decimals();
    for result in results {
        println!(
            "{:<40} {:>8}h {:>6}%  ({})",
            topics.path_label(result.topic_id),
            round_for_display(result.effective_benchmark_hours, decimals),
            round_for_display(result.effective_progress_percent, decimals),
            result.display_label,
        );
    }
    Ok(())
}

fn print_frame(frame: &RenderedFrame) {
    match (&frame.sort_key, frame.sort_direction) {
        (Some(key), Some(direction)) => {
            println!("== {} == (by {key} {direction:?})", frame.trail.join(" / "));
        }
        _ => println!("== {} ==", frame.trail.join(" / ")),
    }
    match &frame.rows {
        FrameRows::Topics(result) => {
            for row in &result.items {
                println!(
                    "  [{}] {:<36} {:>8}h {:>6}% ({})",
                    row.id, row.path, row.benchmark_hours, row.progress_percent, row.progress_label
                );
            }
            println!("  showing {} of {} ({} total)", result.shown(), result.matched, result.total);
        }
        FrameRows::Entries(result) => {
            for row in &result.items {
                let target = match row.project_id {
                    Some(project) => format!("project {project}"),
                    None => row.topic.clone(),
                };
                println!(
                    "  #{} {} user {} {:<24} {:>5}h {:>5}% {}",
                    row.id,
                    row.date,
                    row.user_id,
                    target,
                    row.hours,
                    row.progress_percent,
                    row.status.as_str()
                );
            }
            println!("  showing {} of {} ({} total)", result.shown(), result.matched, result.total);
        }
        FrameRows::Detail(Some(row)) => {
            println!("  entry:     #{}", row.id);
            println!("  user:      {}", row.user_id);
            println!("  topic:     {}", row.topic);
            println!("  date:      {}", row.date);
            println!("  hours:     {}", row.hours);
            println!("  progress:  {}%", row.progress_percent);
            println!("  completed: {}", row.is_completed);
            println!("  status:    {} (ai: {})", row.status.as_str(), row.ai_status.as_str());
        }
        FrameRows::Detail(None) => println!("  (record no longer in snapshot)"),
    }
}

fn render_current(nav: &ReviewNavigator) {
    if let Some(frame) = nav.render() {
        print_frame(&frame);
    }
}

async fn walk(
    source: &dyn SnapshotSource,
    settings: ViewSettings,
    topic: Option<TopicId>,
    entry: Option<EntryId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut nav = ReviewNavigator::load(source, settings, Clock::default_clock()).await?;
    nav.open_topics();
    render_current(&nav);

    if let Some(topic) = topic {
        nav.drill_into_topic(topic)?;
        render_current(&nav);
    }
    if let Some(entry) = entry {
        nav.drill_into_entry(entry)?;
        render_current(&nav);
    }

    while nav.stack().can_go_back() {
        nav.back();
        render_current(&nav);
    }
    nav.close();
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => Command::Report,
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(cmd, &mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let settings = config::load_settings(parsed.config.as_deref()).await?;
    let source = load_snapshot(&parsed.snapshot).await?;
    info!(snapshot = %parsed.snapshot.display(), ?cmd, "snapshot loaded");

    match cmd {
        Command::Report => report(&source, &settings, parsed.user, parsed.json).await,
        Command::Walk => walk(&source, settings, parsed.topic, parsed.entry).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
