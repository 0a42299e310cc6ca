mod terminal;

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use quiz_core::model::{ExamMode, ExamSettingsDraft, Language, TestDuration};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    Clock, ExamLoopService, PreferencesService, QuestionBank, ResultView, RunningSession,
    SessionError, SessionHost,
};
use storage::{JsonQuestionRepository, QuestionRepository, TomlPreferencesStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terminal::TerminalFeedback;

const BUNDLED_QUESTIONS: &str = include_str!("../assets/questions.json");
const DEFAULT_PREFS_PATH: &str = "quiz-prefs.toml";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidSeed { raw: String },
    InvalidLanguage { raw: String },
    InvalidDuration { raw: String },
    InvalidSound { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidLanguage { raw } => write!(f, "invalid --lang value: {raw}"),
            ArgsError::InvalidDuration { raw } => {
                write!(f, "invalid --minutes value: {raw} (use 15, 30, 45, 60 or 90)")
            }
            ArgsError::InvalidSound { raw } => write!(f, "invalid --sound value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app practice [--questions <path>] [--prefs <path>]");
    eprintln!("  app test     [--questions <path>] [--prefs <path>] [--seed <n>]");
    eprintln!("  app prefs    [--prefs <path>] [--lang de|en|ru|uk] [--minutes <n>] [--sound on|off]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  questions: bundled sample catalogue");
    eprintln!("  --prefs {DEFAULT_PREFS_PATH}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS, QUIZ_PREFS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Test,
    Prefs,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "test" => Some(Self::Test),
            "prefs" => Some(Self::Prefs),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PrefsUpdate {
    language: Option<Language>,
    duration: Option<TestDuration>,
    sound_on: Option<bool>,
}

#[derive(Debug)]
struct Args {
    questions: Option<PathBuf>,
    prefs: PathBuf,
    seed: Option<u64>,
    update: PrefsUpdate,
}

impl Args {
    fn parse(command: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            questions: std::env::var_os("QUIZ_QUESTIONS").map(PathBuf::from),
            prefs: std::env::var_os("QUIZ_PREFS")
                .map_or_else(|| PathBuf::from(DEFAULT_PREFS_PATH), PathBuf::from),
            seed: None,
            update: PrefsUpdate::default(),
        };

        while let Some(arg) = args.next() {
            match (command, arg.as_str()) {
                (_, "--prefs") => parsed.prefs = require_value(args, "--prefs")?.into(),
                (Command::Practice | Command::Test, "--questions") => {
                    parsed.questions = Some(require_value(args, "--questions")?.into());
                }
                (Command::Test, "--seed") => {
                    let value = require_value(args, "--seed")?;
                    let seed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    parsed.seed = Some(seed);
                }
                (Command::Prefs, "--lang") => {
                    let value = require_value(args, "--lang")?;
                    let language = Language::parse(&value)
                        .ok_or_else(|| ArgsError::InvalidLanguage { raw: value.clone() })?;
                    parsed.update.language = Some(language);
                }
                (Command::Prefs, "--minutes") => {
                    let value = require_value(args, "--minutes")?;
                    let duration = value
                        .parse::<u32>()
                        .ok()
                        .and_then(|minutes| TestDuration::from_secs(minutes.saturating_mul(60)))
                        .ok_or_else(|| ArgsError::InvalidDuration { raw: value.clone() })?;
                    parsed.update.duration = Some(duration);
                }
                (Command::Prefs, "--sound") => {
                    let value = require_value(args, "--sound")?;
                    parsed.update.sound_on = Some(match value.as_str() {
                        "on" => true,
                        "off" => false,
                        _ => return Err(ArgsError::InvalidSound { raw: value }),
                    });
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn question_source(args: &Args) -> Arc<dyn QuestionRepository> {
    match &args.questions {
        Some(path) => Arc::new(JsonQuestionRepository::from_path(path.clone())),
        None => Arc::new(JsonQuestionRepository::from_bytes(BUNDLED_QUESTIONS.as_bytes())),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let command = match argv.next() {
        None => Command::Practice,
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            print_usage();
            ArgsError::UnknownCommand(first)
        })?,
    };

    let args = Args::parse(command, &mut argv).inspect_err(|_| print_usage())?;
    let preferences = PreferencesService::new(Arc::new(TomlPreferencesStore::new(&args.prefs)));

    if command == Command::Prefs {
        return save_preferences(&preferences, args.update).await;
    }

    let settings = preferences.load_or_default().await;
    let loop_svc = ExamLoopService::new(Clock::default(), QuestionBank::new(question_source(&args)))
        .with_feedback(Arc::new(TerminalFeedback));

    let mode = match command {
        Command::Test => ExamLoopService::test_mode(&settings),
        _ => ExamMode::Practice,
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let outcome: Rc<RefCell<Option<ResultView>>> = Rc::default();
    let slot = Rc::clone(&outcome);
    let session = match loop_svc.build_session(mode, &settings, &mut rng).await {
        Ok(session) => session.on_finished(move |result| {
            *slot.borrow_mut() = Some(ResultView::from(result));
        }),
        Err(SessionError::NotReady) => {
            eprintln!("The question catalogue could not be loaded.");
            return Err(SessionError::NotReady.into());
        }
        Err(err) => return Err(err.into()),
    };

    let mut inputs = terminal::spawn_input_reader();
    let mut host = SessionHost::new();
    let running = host.start(RunningSession::new(session));
    let end = terminal::run_session(running, &mut inputs).await;
    host.stop();

    tracing::debug!(?end, "session loop ended");
    if let Some(result) = outcome.borrow_mut().take() {
        terminal::print_result(&result);
    }
    Ok(())
}

async fn save_preferences(
    preferences: &PreferencesService,
    update: PrefsUpdate,
) -> Result<(), Box<dyn std::error::Error>> {
    let current = preferences.load_or_default().await;
    let mut draft: ExamSettingsDraft = current.to_draft();
    if let Some(language) = update.language {
        draft.translation_language = language;
    }
    if let Some(duration) = update.duration {
        draft.test_duration_secs = duration.secs();
    }
    if let Some(sound_on) = update.sound_on {
        draft.sound_on = sound_on;
    }

    let saved = preferences.save(draft).await?;
    println!(
        "language: {} {}",
        saved.translation_language().flag(),
        saved.translation_language().label()
    );
    println!(
        "test duration: {}",
        TestDuration::from_secs(saved.test_duration_secs())
            .map_or_else(|| terminal::format_clock(saved.test_duration_secs()), TestDuration::formatted)
    );
    println!("sound: {}", if saved.sound_on() { "on" } else { "off" });
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // Binary glue: report once and exit.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
