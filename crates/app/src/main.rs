use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use prep_core::analytics::{self, CategoryFilter, SubjectAveraging, TimeRange};
use prep_core::pomodoro::{Phase, Pomodoro, PomodoroConfig, format_clock};
use serde::Serialize;
use services::{AppServices, Clock, ResultsDashboard};
use storage::repository::Storage;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,prep=info,services=info,storage=info";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNow { raw: String },
    InvalidChoice { flag: &'static str, raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    MissingSubject,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
            ArgsError::InvalidChoice { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value (expected a positive number): {raw}")
            }
            ArgsError::MissingSubject => write!(f, "trend requires --subject <name>"),
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

fn parse_choice<T: FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidChoice { flag, raw })
}

fn parse_number<T: FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_now(raw: String) -> Result<DateTime<Utc>, ArgsError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ArgsError::InvalidNow { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  prep [summary]  [--category <c>] [--range <r>] [--averaging <a>] [--json]");
    eprintln!("  prep subjects   [--category <c>] [--json]");
    eprintln!("  prep trend      --subject <name> [--category <c>] [--json]");
    eprintln!("  prep list       [--category <c>] [--json]");
    eprintln!("  prep pomodoro   [--cycles <n>] [--tick-ms <ms>] [--work <min>]");
    eprintln!("                  [--short-break <min>] [--long-break <min>] [--sessions <n>]");
    eprintln!("  prep study      [--topic <name>] [--minutes <n>] [--tick-ms <ms>]");
    eprintln!();
    eprintln!("Choices:");
    eprintln!("  --category  all | TYT | AYT | YDT");
    eprintln!("  --range     last-week | last-month | last-three-months | all-time");
    eprintln!("  --averaging mean | running-pairwise");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --now <rfc3339>   Fixed current time (default: system clock)");
    eprintln!("  --json            Print machine-readable output");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_NOW, PREP_RANGE, PREP_CATEGORY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Summary,
    Subjects,
    Trend,
    List,
    Pomodoro,
    Study,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "summary" => Some(Self::Summary),
            "subjects" => Some(Self::Subjects),
            "trend" => Some(Self::Trend),
            "list" => Some(Self::List),
            "pomodoro" => Some(Self::Pomodoro),
            "study" => Some(Self::Study),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Args {
    now: Option<DateTime<Utc>>,
    category: Option<CategoryFilter>,
    range: Option<TimeRange>,
    averaging: Option<SubjectAveraging>,
    json: bool,
    subject: Option<String>,
    cycles: u32,
    tick: Duration,
    work_minutes: Option<u32>,
    short_break_minutes: Option<u32>,
    long_break_minutes: Option<u32>,
    sessions: Option<u32>,
    topic: String,
    target_minutes: u32,
}

impl Args {
    /// Parse flags; `Ok(None)` means help was requested.
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut now = match std::env::var("PREP_NOW") {
            Ok(value) => Some(parse_now(value)?),
            Err(_) => None,
        };
        let mut category = match std::env::var("PREP_CATEGORY") {
            Ok(value) => Some(parse_choice(value, "PREP_CATEGORY")?),
            Err(_) => None,
        };
        let mut range = match std::env::var("PREP_RANGE") {
            Ok(value) => Some(parse_choice(value, "PREP_RANGE")?),
            Err(_) => None,
        };
        let mut averaging = None;
        let mut json = false;
        let mut subject = None;
        let mut cycles = 1;
        let mut tick = Duration::from_secs(1);
        let mut work_minutes = None;
        let mut short_break_minutes = None;
        let mut long_break_minutes = None;
        let mut sessions = None;
        let mut topic = "Matematik".to_owned();
        let mut target_minutes = 60;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--now" => now = Some(parse_now(require_value(args, "--now")?)?),
                "--category" => {
                    let value = require_value(args, "--category")?;
                    category = Some(parse_choice(value, "--category")?);
                }
                "--range" => {
                    range = Some(parse_choice(require_value(args, "--range")?, "--range")?);
                }
                "--averaging" => {
                    averaging = Some(parse_choice(
                        require_value(args, "--averaging")?,
                        "--averaging",
                    )?);
                }
                "--json" => json = true,
                "--subject" => subject = Some(require_value(args, "--subject")?),
                "--cycles" => cycles = parse_number(require_value(args, "--cycles")?, "--cycles")?,
                "--tick-ms" => {
                    let ms: u64 = parse_number(require_value(args, "--tick-ms")?, "--tick-ms")?;
                    tick = Duration::from_millis(ms.max(1));
                }
                "--work" => {
                    work_minutes = Some(parse_number(require_value(args, "--work")?, "--work")?);
                }
                "--short-break" => {
                    short_break_minutes = Some(parse_number(
                        require_value(args, "--short-break")?,
                        "--short-break",
                    )?);
                }
                "--long-break" => {
                    long_break_minutes = Some(parse_number(
                        require_value(args, "--long-break")?,
                        "--long-break",
                    )?);
                }
                "--sessions" => {
                    let value = require_value(args, "--sessions")?;
                    sessions = Some(parse_number(value, "--sessions")?);
                }
                "--topic" => topic = require_value(args, "--topic")?,
                "--minutes" => {
                    target_minutes = parse_number(require_value(args, "--minutes")?, "--minutes")?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            now,
            category,
            range,
            averaging,
            json,
            subject,
            cycles,
            tick,
            work_minutes,
            short_break_minutes,
            long_break_minutes,
            sessions,
            topic,
            target_minutes,
        }))
    }

    fn clock(&self) -> Clock {
        self.now.map_or_else(Clock::default_clock, Clock::fixed)
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build services over in-memory storage holding the sample exams.
///
/// A `--averaging` override is saved as a setting first so the services pick
/// it up the same way they would a stored preference.
async fn open_services(args: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = args.clock();
    let mut app = AppServices::new(clock, Storage::in_memory()).await?;

    if let Some(averaging) = args.averaging {
        let mut draft = app.settings().to_draft();
        draft.subject_averaging = averaging;
        app.save_settings(draft).await?;
    }

    let seeded = app.seed_samples().await?;
    debug!(seeded, fixed_clock = clock.is_fixed(), "services ready");
    Ok(app)
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_dashboard(dashboard: &ResultsDashboard) {
    let progress = &dashboard.progress;
    println!(
        "{} results, {} ({} in range)",
        dashboard.filter, dashboard.range, progress.result_count
    );
    if progress.is_empty() {
        println!("  no results in this range");
        return;
    }
    println!("  average net:        {:.2}", progress.average_net_score);
    println!("  average percentage: {:.1}%", progress.average_percentage);
    if let Some(best) = &progress.best_subject {
        println!("  best subject:       {} ({:.2})", best.subject, best.score);
    }
    if let Some(worst) = &progress.worst_subject {
        println!("  worst subject:      {} ({:.2})", worst.subject, worst.score);
    }
    if progress.has_trend_data() {
        println!("  improvement:        {:+.1} points", progress.improvement);
    } else {
        println!("  improvement:        needs two results");
    }
}

async fn run_pomodoro(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = pomodoro_config(app.pomodoro().config(), args)?;
    let mut timer = Pomodoro::new(config);
    timer.start();
    println!("{} {}", timer.phase(), format_clock(timer.remaining()));

    // Each interval tick stands in for one second of timer time.
    let mut interval = tokio::time::interval(args.tick);
    loop {
        interval.tick().await;
        if let Some(done) = timer.tick(Duration::from_secs(1)) {
            println!(
                "{} done ({} sessions) -> {} {}",
                done.finished,
                done.completed_sessions,
                done.next,
                format_clock(timer.remaining())
            );
            if done.finished == Phase::Work && done.completed_sessions >= args.cycles {
                break;
            }
        }
    }
    Ok(())
}

fn pomodoro_config(
    base: &PomodoroConfig,
    args: &Args,
) -> Result<PomodoroConfig, prep_core::Error> {
    let minutes = |value: Option<u32>, fallback: Duration| {
        value.map_or(fallback, |m| Duration::from_secs(u64::from(m) * 60))
    };
    let config = PomodoroConfig::new(
        minutes(args.work_minutes, base.work()),
        minutes(args.short_break_minutes, base.short_break()),
        minutes(args.long_break_minutes, base.long_break()),
        args.sessions.unwrap_or(base.sessions_before_long_break()),
    )?;
    Ok(config)
}

async fn run_study(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = app.study_tracker();
    let mut session = tracker.start(&args.topic, args.target_minutes)?;

    // Each interval tick stands in for one minute of study.
    let mut interval = tokio::time::interval(args.tick);
    let finished = loop {
        interval.tick().await;
        if let Some(finished) = tracker.tick(&mut session, Duration::from_secs(60)).await? {
            break finished;
        }
        println!(
            "{} {} / {} ({:.0}%)",
            session.topic(),
            format_clock(session.elapsed()),
            format_clock(session.target()),
            session.progress() * 100.0
        );
    };

    if args.json {
        return print_json(&finished.session);
    }
    println!(
        "recorded {} ({})",
        finished.session.topic,
        format_clock(finished.session.completed)
    );
    if let Some(badge) = finished.badge {
        println!("badge earned: {} ({})", badge.name, badge.description);
    }
    Ok(())
}

/// Split argv into a subcommand and its flags; `Ok(None)` means help.
fn parse_command(mut argv: Vec<String>) -> Result<Option<(Command, Args)>, ArgsError> {
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Summary,
        Some("--help" | "-h") => return Ok(None),
        Some(first) if first.starts_with("--") => Command::Summary,
        Some(first) => {
            Command::from_arg(first).ok_or_else(|| ArgsError::UnknownCommand(first.to_owned()))?
        }
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }
    Ok(Args::parse(&mut argv.into_iter())?.map(|args| (cmd, args)))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    // `main` prints the error itself; only the usage text is added here.
    let (cmd, parsed) = match parse_command(argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            print_usage();
            return Err(err.into());
        }
    };
    let app = open_services(&parsed).await?;
    let exams = app.exam_results();
    let filter = parsed
        .category
        .unwrap_or_else(|| app.settings().default_category());
    let range = parsed
        .range
        .unwrap_or_else(|| app.settings().default_time_range());

    match cmd {
        Command::Summary => {
            let dashboard = exams.dashboard(filter, range).await?;
            if parsed.json {
                return print_json(&dashboard);
            }
            print_dashboard(&dashboard);
        }
        Command::Subjects => {
            let dashboard = exams.dashboard(filter, range).await?;
            if parsed.json {
                return print_json(&dashboard.subjects);
            }
            for insight in &dashboard.subjects {
                println!(
                    "{:<12} {:>6.2}  ({} exams, {})",
                    insight.average.subject,
                    insight.average.average,
                    insight.average.samples,
                    insight.trend
                );
            }
        }
        Command::Trend => {
            let subject = parsed.subject.as_deref().ok_or(ArgsError::MissingSubject)?;
            let results = exams.list(filter).await?;
            let history = analytics::subject_history(subject, &results);
            let trend = exams.trend(subject, filter).await?;
            if parsed.json {
                return print_json(&serde_json::json!({
                    "subject": subject,
                    "trend": trend,
                    "history": history,
                }));
            }
            for (date, score) in &history {
                println!("{}  {score:>6.2}", date.format("%Y-%m-%d"));
            }
            println!("{subject}: {trend}");
        }
        Command::List => {
            let results = exams.list(filter).await?;
            if parsed.json {
                return print_json(&results);
            }
            for result in &results {
                println!(
                    "{:>3}  {}  {:<4} {:<14} net {:>6.2}  {:>5.1}%",
                    result.id().value(),
                    result.date().format("%Y-%m-%d"),
                    result.category(),
                    result.name(),
                    result.net_score(),
                    result.score_percentage()
                );
            }
        }
        Command::Pomodoro => run_pomodoro(&app, &parsed).await?,
        Command::Study => run_study(&app, &parsed).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| (*arg).to_owned()).collect()
    }

    #[test]
    fn help_is_a_result_not_an_exit() {
        assert!(parse_command(argv(&["--help"])).unwrap().is_none());
        assert!(parse_command(argv(&["list", "--json", "-h"])).unwrap().is_none());
    }

    #[test]
    fn unknown_subcommand_is_an_args_error() {
        let err = parse_command(argv(&["sumary"])).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownCommand(ref cmd) if cmd == "sumary"));
        assert_eq!(err.to_string(), "unknown subcommand: sumary");
    }

    #[test]
    fn flags_without_subcommand_mean_summary() {
        let (cmd, args) = parse_command(argv(&["--json", "--averaging", "running"]))
            .unwrap()
            .unwrap();
        assert_eq!(cmd, Command::Summary);
        assert!(args.json);
        assert_eq!(args.averaging, Some(SubjectAveraging::RunningPairwise));
    }

    #[test]
    fn bad_flag_values_are_reported() {
        let err = parse_command(argv(&["trend", "--now", "yesterday"])).unwrap_err();
        assert!(matches!(err, ArgsError::InvalidNow { .. }));
        let err = parse_command(argv(&["pomodoro", "--cycles"])).unwrap_err();
        assert!(matches!(err, ArgsError::MissingValue { flag: "--cycles" }));
    }
}
