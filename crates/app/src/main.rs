use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{LogEntry, ModeKind, PlayMode, QuizSource};
use quiz_core::session::{Session, SessionState};
use services::{
    Clock, Entropy, HistoryService, HistoryStats, PlayError, PlayService, PlaySettings,
    QuizCatalog,
};
use storage::repository::{LogSink, QuizStore};
use storage::sqlite::SqliteRepository;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::TerminalHost;

type Input = Lines<BufReader<Stdin>>;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownSubcommand(String),
    InvalidPath { flag: &'static str, raw: String },
    InvalidSeed { raw: String },
    InvalidHistoryLimit { raw: String },
    UnknownSource { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownSubcommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidPath { flag, raw } => write!(f, "invalid {flag} value: {raw:?}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidHistoryLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::UnknownSource { raw } => write!(f, "no quiz source named {raw:?}"),
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
        return Err(ArgsError::InvalidPath { flag, raw: value });
    }
    Ok(PathBuf::from(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Play,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "play" => Some(Self::Play),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Args {
    banks_dir: PathBuf,
    log_path: PathBuf,
    source: Option<String>,
    mode: Option<String>,
    limit: Option<String>,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut banks_dir = std::env::var("QUIZ_BANK_DIR")
            .map_or_else(|_| PathBuf::from("assets/database"), PathBuf::from);
        let mut log_path = std::env::var("QUIZ_LOG_DB").ok().map(PathBuf::from);
        let mut source = None;
        let mut mode = None;
        let mut limit = None;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--banks" => banks_dir = require_path(args, "--banks")?,
                "--log" => log_path = Some(require_path(args, "--log")?),
                "--source" => source = Some(require_value(args, "--source")?),
                "--mode" => mode = Some(require_value(args, "--mode")?),
                "--limit" => limit = Some(require_value(args, "--limit")?),
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let log_path = log_path.unwrap_or_else(|| banks_dir.join("quiz_log.db"));
        Ok(Self {
            banks_dir,
            log_path,
            source,
            mode,
            limit,
            seed,
        })
    }

    fn entropy(&self) -> Entropy {
        self.seed.map_or(Entropy::Thread, Entropy::Seeded)
    }

    fn history_limit(&self) -> Result<Option<usize>, ArgsError> {
        self.limit
            .as_deref()
            .map(|raw| {
                raw.parse::<usize>()
                    .map_err(|_| ArgsError::InvalidHistoryLimit { raw: raw.to_owned() })
            })
            .transpose()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [play] [options]");
    eprintln!("  cargo run -p app -- list [--banks <dir>]");
    eprintln!("  cargo run -p app -- history [--log <path>] [--limit <n>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --banks <dir>       Quiz bank directory (default: assets/database)");
    eprintln!("  --log <path>        History database (default: <banks>/quiz_log.db)");
    eprintln!("  --source <name|n>   Quiz source by name or list position");
    eprintln!("  --mode <mode>       endless | time-limit | fixed-count");
    eprintln!("  --limit <value>     Seconds or quiz count for the mode; rows for history");
    eprintln!("  --seed <u64>        Deterministic quiz order");
    eprintln!();
    eprintln!("While playing, type the answer and press Enter; :end finishes early.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_DIR, QUIZ_LOG_DB, RUST_LOG");
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Open every `*.db` file in `dir` except the history log.
async fn open_banks(
    dir: &Path,
    log_path: &Path,
) -> Result<Vec<Arc<dyn QuizStore>>, Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "quiz bank directory not found");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "db") && !same_file(&path, log_path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut stores: Vec<Arc<dyn QuizStore>> = Vec::with_capacity(paths.len());
    for path in paths {
        match SqliteRepository::open_bank(&path).await {
            Ok(repo) => stores.push(Arc::new(repo)),
            Err(err) => {
                tracing::warn!(bank = %path.display(), error = %err, "cannot open quiz bank");
                eprintln!("skipped {}: {err}", path.display());
            }
        }
    }
    Ok(stores)
}

async fn open_log(path: &Path) -> Result<SqliteRepository, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteRepository::open_log(path).await?)
}

async fn ask(input: &mut Input, text: &str) -> std::io::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(input
        .next_line()
        .await?
        .map(|line| line.trim_end_matches('\r').to_owned()))
}

async fn choose_source(
    catalog: &QuizCatalog,
    requested: Option<&str>,
    input: &mut Input,
) -> Result<Option<Arc<QuizSource>>, Box<dyn std::error::Error>> {
    if let Some(key) = requested {
        return catalog
            .find(key)
            .map(Some)
            .ok_or_else(|| ArgsError::UnknownSource { raw: key.to_owned() }.into());
    }

    terminal::print_catalog(catalog);
    loop {
        let Some(line) = ask(input, &format!("Choose a quiz [1-{}]: ", catalog.len())).await? else {
            return Ok(None);
        };
        match catalog.find(&line) {
            Some(source) => return Ok(Some(source)),
            None => println!("No quiz {:?}.", line.trim()),
        }
    }
}

async fn choose_mode(
    settings: &PlaySettings,
    args: &Args,
    input: &mut Input,
) -> Result<Option<PlayMode>, Box<dyn std::error::Error>> {
    if let Some(mode) = args.mode.as_deref() {
        return Ok(Some(settings.parse(mode, args.limit.as_deref())?));
    }

    let kind = loop {
        let Some(line) = ask(input, "Mode (endless / time-limit / fixed-count) [endless]: ").await?
        else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            break ModeKind::Endless;
        }
        match line.parse::<ModeKind>() {
            Ok(kind) => break kind,
            Err(err) => println!("{err}"),
        }
    };

    let raw = match kind {
        ModeKind::Endless => None,
        ModeKind::TimeLimited => {
            let text = format!("Time limit in seconds [{}]: ", settings.time_limit.default);
            ask(input, &text).await?
        }
        ModeKind::FixedCount => {
            let text = format!("Number of quizzes [{}]: ", settings.quiz_count.default);
            ask(input, &text).await?
        }
    };
    Ok(Some(settings.resolve(kind, raw.as_deref())))
}

async fn handle_line(svc: &mut PlayService, line: &str) -> Result<(), PlayError> {
    let line = line.trim_end_matches('\r');
    if matches!(line.trim(), ":end" | ":retire" | ":quit") {
        return svc.retire().await;
    }
    let in_feedback = svc
        .session()
        .is_some_and(|s| s.state() == SessionState::Feedback);
    if in_feedback {
        svc.request_next().await
    } else {
        svc.submit_answer(line).await
    }
}

/// Feed timer ticks, input lines and ctrl-c into the session until it finishes.
///
/// End of input, an unreadable line and ctrl-c all retire the session, so the quiz on
/// screen is logged before the caller closes the service.
async fn drive<R>(svc: &mut PlayService, input: &mut Lines<R>)
where
    R: AsyncBufRead + Unpin,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    while svc.is_playing() {
        let outcome = tokio::select! {
            _ = ticker.tick() => {
                svc.tick().await;
                Ok(())
            }
            line = input.next_line() => match line {
                Ok(Some(line)) => handle_line(svc, &line).await,
                Ok(None) => svc.retire().await,
                Err(err) => {
                    eprintln!("input error: {err}");
                    svc.retire().await
                }
            },
            _ = tokio::signal::ctrl_c() => svc.retire().await,
        };
        if let Err(err) = outcome {
            eprintln!("{err}");
        }
    }
}

async fn play(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_log(&args.log_path).await?;
    let stores = open_banks(&args.banks_dir, &args.log_path).await?;
    let catalog = QuizCatalog::load(&stores).await?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let Some(source) = choose_source(&catalog, args.source.as_deref(), &mut input).await? else {
        return Ok(());
    };
    let settings = PlaySettings::default();
    let Some(mode) = choose_mode(&settings, args, &mut input).await? else {
        return Ok(());
    };

    let sink: Arc<dyn LogSink> = Arc::new(log);
    let history = HistoryService::new(Arc::clone(&sink));
    let mut svc = PlayService::new(
        Clock::default_clock(),
        args.entropy(),
        sink,
        Box::new(TerminalHost),
    );
    svc.select_source(source);
    svc.start(mode).await?;

    drive(&mut svc, &mut input).await;

    let summary = svc.session().and_then(Session::summary).cloned();
    if let Some(summary) = summary {
        let unsaved: Vec<LogEntry> = svc.pending_logs().cloned().collect();
        match history.for_session(&summary, &unsaved).await {
            Ok(entries) => {
                println!();
                terminal::print_log(&entries);
            }
            Err(err) => eprintln!("warning: history unavailable: {err}"),
        }
    }
    if let Err(err) = svc.close().await {
        eprintln!("warning: {err}");
    }
    Ok(())
}

async fn list(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let stores = open_banks(&args.banks_dir, &args.log_path).await?;
    let catalog = QuizCatalog::load(&stores).await?;
    terminal::print_catalog(&catalog);
    Ok(())
}

async fn history(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let limit = args.history_limit()?;
    let log = open_log(&args.log_path).await?;
    let history = HistoryService::new(Arc::new(log.clone()));
    let entries = history.recent(limit).await?;
    terminal::print_log(&entries);
    terminal::print_stats(&HistoryStats::from_entries(&entries));
    log.close().await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();

    let first = argv.peek().cloned();
    let cmd = match first.as_deref() {
        None => Command::Play,
        Some(first) if first.starts_with('-') => Command::Play,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                print_usage();
                ArgsError::UnknownSubcommand(first.to_owned())
            })?;
            argv.next();
            cmd
        }
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    match cmd {
        Command::List => list(&args).await,
        Command::Play => play(&args).await,
        Command::History => history(&args).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerResult, Overview, Quiz};
    use quiz_core::time::fixed_clock;
    use services::{PlayEvent, PresentationHost};
    use storage::repository::InMemoryLogSink;

    struct SilentHost;

    impl PresentationHost for SilentHost {
        fn notify(&mut self, _event: &PlayEvent) {}
    }

    async fn fixed_count_service(sink: &InMemoryLogSink) -> PlayService {
        let quizzes = vec![Quiz::from_delimited("cat", "cat", "")];
        let source = QuizSource::from_pool(Some(Overview::new("Cats", "")), quizzes).unwrap();
        let mut svc = PlayService::new(
            fixed_clock(),
            Entropy::Seeded(3),
            Arc::new(sink.clone()),
            Box::new(SilentHost),
        );
        svc.select_source(Arc::new(source));
        svc.start(PlayMode::FixedCount { count: 5 }).await.unwrap();
        svc
    }

    #[tokio::test]
    async fn unreadable_input_retires_and_logs_the_open_quiz() {
        let sink = InMemoryLogSink::new();
        let mut svc = fixed_count_service(&sink).await;
        let mut input = (&b"dog\n\xff\xfe\n"[..]).lines();

        drive(&mut svc, &mut input).await;
        svc.close().await.unwrap();

        let results: Vec<_> = sink.snapshot().unwrap().iter().map(|e| e.result).collect();
        assert_eq!(results, [AnswerResult::Incorrect, AnswerResult::NoAnswer]);
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn end_of_input_retires_the_session() {
        let sink = InMemoryLogSink::new();
        let mut svc = fixed_count_service(&sink).await;
        let mut input = (&b"cat\n"[..]).lines();

        drive(&mut svc, &mut input).await;

        assert!(!svc.is_playing());
        let results: Vec<_> = sink.snapshot().unwrap().iter().map(|e| e.result).collect();
        assert_eq!(results, [AnswerResult::Correct, AnswerResult::NoAnswer]);
    }
}
